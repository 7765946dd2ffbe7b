//! Modelo de Service
//!
//! Servicio del catálogo con su precio base de mano de obra.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogEntity, EntityKind, PgQueryAs};
use crate::utils::errors::AppResult;
use crate::utils::money::normalize_money;
use crate::utils::validation::validate_non_negative_money;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub description: String,
    pub labor_price: Decimal,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 2, max = 160))]
    pub description: String,

    #[validate(custom = "validate_non_negative_money")]
    pub labor_price: Decimal,

    #[validate(length(max = 60))]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 2, max = 160))]
    pub description: Option<String>,

    #[validate(custom = "validate_non_negative_money")]
    pub labor_price: Option<Decimal>,

    #[validate(length(max = 60))]
    pub category: Option<String>,
}

impl CatalogEntity for Service {
    const KIND: EntityKind = EntityKind::Service;
    const COLUMNS: &'static [&'static str] = &["description", "labor_price", "category"];
    const ORDER_BY: &'static str = "description";

    type Create = CreateServiceRequest;
    type Update = UpdateServiceRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreateServiceRequest) -> AppResult<Self> {
        Ok(Self {
            id,
            description: request.description.trim().to_string(),
            labor_price: normalize_money(request.labor_price, "labor_price")?,
            category: request.category,
        })
    }

    fn apply_update(&mut self, request: UpdateServiceRequest) -> AppResult<()> {
        if let Some(price) = request.labor_price {
            self.labor_price = normalize_money(price, "labor_price")?;
        }
        if let Some(description) = request.description {
            self.description = description.trim().to_string();
        }
        self.category = request.category.or(self.category.take());
        Ok(())
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.description.clone())
            .bind(self.labor_price)
            .bind(self.category.clone())
    }
}
