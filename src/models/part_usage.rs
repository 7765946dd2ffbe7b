//! Modelo de PartUsage
//!
//! Una pieza consumida por una orden de servicio, con el precio unitario
//! vigente en el momento del uso.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::AppResult;
use crate::utils::money::{self, checked_sum};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PartUsage {
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub used_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Request para agregar una pieza a una orden
///
/// Sin `unit_price` se usa el precio actual del catálogo.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachPartRequest {
    pub part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub used_on: NaiveDate,
}

impl PartUsage {
    /// Total de la línea, siempre calculado a partir de lo almacenado
    pub fn line_total(&self) -> AppResult<Decimal> {
        money::line_total(self.quantity, self.unit_price)
    }
}

/// Suma de los totales de línea
pub fn parts_total<'a, I>(usages: I) -> AppResult<Decimal>
where
    I: IntoIterator<Item = &'a PartUsage>,
{
    let lines = usages
        .into_iter()
        .map(PartUsage::line_total)
        .collect::<AppResult<Vec<_>>>()?;
    checked_sum(lines)
}
