//! Modelos de reportes
//!
//! Formas de salida de los agregados por ventana de fechas.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::execution::ExecutionStatus;

/// Ventana inclusiva `[start_date, end_date]`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRange {
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
    #[serde(alias = "endDate")]
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self { start_date, end_date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Órdenes abiertas por funcionario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeOrderCount {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub total_orders: u64,
}

/// Servicios agrupados por descripción
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSummary {
    pub description: String,
    pub times_performed: u64,
    pub total_revenue: Decimal,
}

/// Valor total de piezas usadas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartsTotal {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: Decimal,
}

/// Piezas agrupadas por nombre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartUsageSummary {
    pub part_name: String,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

/// Ejecución con su contexto de orden, vehículo, cliente y servicio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionReportRow {
    pub execution_id: Uuid,
    pub service_order_id: Uuid,
    pub opened_on: NaiveDate,
    pub finalized_on: NaiveDate,
    pub customer_name: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub service_description: Option<String>,
    pub payment_method: Option<String>,
    pub value: Decimal,
    pub discounted_value: Option<Decimal>,
    pub status: ExecutionStatus,
}

/// Indicadores de desempeño por funcionario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeePerformance {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub role: String,
    pub total_orders: u64,
    pub completed_services: u64,
    /// Porcentaje de órdenes concluidas (0-100)
    pub completion_rate: Decimal,
    /// Promedio de días entre apertura y finalización
    pub efficiency: Decimal,
    pub total_revenue: Decimal,
}
