//! Modelo de Part
//!
//! Pieza del catálogo. El precio del catálogo es solo una sugerencia: cada
//! `PartUsage` guarda su propio precio unitario al momento del uso.

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
pub struct Part {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,

    #[validate(length(max = 40))]
    pub code: Option<String>,

    #[validate(custom = "validate_non_negative_money")]
    pub price: Decimal,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    #[validate(length(max = 120))]
    pub supplier: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePartRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: Option<String>,

    #[validate(length(max = 40))]
    pub code: Option<String>,

    #[validate(custom = "validate_non_negative_money")]
    pub price: Option<Decimal>,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    #[validate(length(max = 120))]
    pub supplier: Option<String>,
}

impl CatalogEntity for Part {
    const KIND: EntityKind = EntityKind::Part;
    const COLUMNS: &'static [&'static str] = &["name", "code", "price", "stock", "supplier"];
    const ORDER_BY: &'static str = "name";

    type Create = CreatePartRequest;
    type Update = UpdatePartRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreatePartRequest) -> AppResult<Self> {
        Ok(Self {
            id,
            name: request.name.trim().to_string(),
            code: request.code,
            price: normalize_money(request.price, "price")?,
            stock: request.stock.unwrap_or(0),
            supplier: request.supplier,
        })
    }

    fn apply_update(&mut self, request: UpdatePartRequest) -> AppResult<()> {
        if let Some(price) = request.price {
            self.price = normalize_money(price, "price")?;
        }
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(stock) = request.stock {
            self.stock = stock;
        }
        self.code = request.code.or(self.code.take());
        self.supplier = request.supplier.or(self.supplier.take());
        Ok(())
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.name.clone())
            .bind(self.code.clone())
            .bind(self.price)
            .bind(self.stock)
            .bind(self.supplier.clone())
    }
}
