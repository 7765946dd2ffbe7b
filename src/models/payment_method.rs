//! Modelo de PaymentMethod

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogEntity, EntityKind, PgQueryAs};
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentMethodRequest {
    #[validate(length(min = 2, max = 60))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePaymentMethodRequest {
    #[validate(length(min = 2, max = 60))]
    pub description: Option<String>,
}

impl CatalogEntity for PaymentMethod {
    const KIND: EntityKind = EntityKind::PaymentMethod;
    const COLUMNS: &'static [&'static str] = &["description"];
    const ORDER_BY: &'static str = "description";

    type Create = CreatePaymentMethodRequest;
    type Update = UpdatePaymentMethodRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreatePaymentMethodRequest) -> AppResult<Self> {
        Ok(Self {
            id,
            description: request.description.trim().to_string(),
        })
    }

    fn apply_update(&mut self, request: UpdatePaymentMethodRequest) -> AppResult<()> {
        if let Some(description) = request.description {
            self.description = description.trim().to_string();
        }
        Ok(())
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query.bind(self.description.clone())
    }
}
