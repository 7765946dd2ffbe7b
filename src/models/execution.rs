//! Modelo de Execution
//!
//! Cierre financiero y temporal de una orden de servicio. El estado y el
//! valor con descuento no se guardan: se derivan en cada lectura.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ejecución - mapea a la tabla executions (una por orden)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Execution {
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub value: Decimal,
    pub finalized_on: NaiveDate,
    pub payment_method_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Estado derivado de la fecha de finalización
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionStatus {
    InProgress,
    Completed,
}

impl ExecutionStatus {
    /// `InProgress` solo si la finalización es estrictamente posterior a `today`
    pub fn derive(finalized_on: NaiveDate, today: NaiveDate) -> Self {
        if finalized_on > today {
            ExecutionStatus::InProgress
        } else {
            ExecutionStatus::Completed
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionStatus::Completed)
    }
}

/// Request para finalizar una orden
///
/// Sin `value` se toma el precio de mano de obra del servicio de la orden.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizeOrderRequest {
    pub service_order_id: Uuid,
    pub value: Option<Decimal>,
    pub finalized_on: NaiveDate,
    pub payment_method_id: Uuid,
}

/// Campos editables de una ejecución existente
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExecutionRequest {
    pub value: Option<Decimal>,
    pub finalized_on: Option<NaiveDate>,
    pub payment_method_id: Option<Uuid>,
}

impl Execution {
    pub fn status(&self, today: NaiveDate) -> ExecutionStatus {
        ExecutionStatus::derive(self.finalized_on, today)
    }
}
