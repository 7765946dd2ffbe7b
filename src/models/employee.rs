//! Modelo de Employee
//!
//! Funcionario del taller responsable por las órdenes de servicio.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogEntity, EntityKind, PgQueryAs};
use crate::utils::errors::AppResult;
use crate::utils::money::normalize_money;
use crate::utils::validation::{validate_non_negative_money, validate_phone, validate_tax_id};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub tax_id: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub salary: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,

    #[validate(length(min = 2, max = 60))]
    pub role: String,

    #[validate(custom = "validate_tax_id")]
    pub tax_id: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(max = 80))]
    pub specialty: Option<String>,

    pub hired_on: Option<NaiveDate>,

    #[validate(custom = "validate_non_negative_money")]
    pub salary: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: Option<String>,

    #[validate(length(min = 2, max = 60))]
    pub role: Option<String>,

    #[validate(custom = "validate_tax_id")]
    pub tax_id: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(max = 80))]
    pub specialty: Option<String>,

    pub hired_on: Option<NaiveDate>,

    #[validate(custom = "validate_non_negative_money")]
    pub salary: Option<Decimal>,
}

impl CatalogEntity for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    const COLUMNS: &'static [&'static str] = &[
        "name", "role", "tax_id", "phone", "specialty", "hired_on", "salary",
    ];
    const ORDER_BY: &'static str = "name";

    type Create = CreateEmployeeRequest;
    type Update = UpdateEmployeeRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreateEmployeeRequest) -> AppResult<Self> {
        let salary = request
            .salary
            .map(|s| normalize_money(s, "salary"))
            .transpose()?;

        Ok(Self {
            id,
            name: request.name.trim().to_string(),
            role: request.role,
            tax_id: request.tax_id,
            phone: request.phone,
            specialty: request.specialty,
            hired_on: request.hired_on,
            salary,
        })
    }

    fn apply_update(&mut self, request: UpdateEmployeeRequest) -> AppResult<()> {
        if let Some(salary) = request.salary {
            self.salary = Some(normalize_money(salary, "salary")?);
        }
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(role) = request.role {
            self.role = role;
        }
        if let Some(tax_id) = request.tax_id {
            self.tax_id = tax_id;
        }
        self.phone = request.phone.or(self.phone.take());
        self.specialty = request.specialty.or(self.specialty.take());
        self.hired_on = request.hired_on.or(self.hired_on);
        Ok(())
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.name.clone())
            .bind(self.role.clone())
            .bind(self.tax_id.clone())
            .bind(self.phone.clone())
            .bind(self.specialty.clone())
            .bind(self.hired_on)
            .bind(self.salary)
    }
}
