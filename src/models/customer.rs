//! Modelo de Customer
//!
//! Cliente del taller, dueño de uno o más vehículos.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogEntity, EntityKind, PgQueryAs};
use crate::utils::errors::AppResult;
use crate::utils::validation::validate_tax_id;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub tax_id: String,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
}

/// Request para crear un nuevo cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,

    #[validate(custom = "validate_tax_id")]
    pub tax_id: String,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 80))]
    pub city: Option<String>,

    #[validate(length(max = 80))]
    pub district: Option<String>,

    #[validate(length(max = 120))]
    pub street: Option<String>,

    #[validate(length(max = 20))]
    pub number: Option<String>,
}

/// Request para actualizar un cliente existente
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: Option<String>,

    #[validate(custom = "validate_tax_id")]
    pub tax_id: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 80))]
    pub city: Option<String>,

    #[validate(length(max = 80))]
    pub district: Option<String>,

    #[validate(length(max = 120))]
    pub street: Option<String>,

    #[validate(length(max = 20))]
    pub number: Option<String>,
}

impl CatalogEntity for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    const COLUMNS: &'static [&'static str] = &[
        "name", "tax_id", "birth_date", "city", "district", "street", "number",
    ];
    const ORDER_BY: &'static str = "name";

    type Create = CreateCustomerRequest;
    type Update = UpdateCustomerRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreateCustomerRequest) -> AppResult<Self> {
        Ok(Self {
            id,
            name: request.name.trim().to_string(),
            tax_id: request.tax_id,
            birth_date: request.birth_date,
            city: request.city,
            district: request.district,
            street: request.street,
            number: request.number,
        })
    }

    fn apply_update(&mut self, request: UpdateCustomerRequest) -> AppResult<()> {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(tax_id) = request.tax_id {
            self.tax_id = tax_id;
        }
        self.birth_date = request.birth_date.or(self.birth_date);
        self.city = request.city.or(self.city.take());
        self.district = request.district.or(self.district.take());
        self.street = request.street.or(self.street.take());
        self.number = request.number.or(self.number.take());
        Ok(())
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.name.clone())
            .bind(self.tax_id.clone())
            .bind(self.birth_date)
            .bind(self.city.clone())
            .bind(self.district.clone())
            .bind(self.street.clone())
            .bind(self.number.clone())
    }
}
