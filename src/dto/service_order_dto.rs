use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::DiscountPolicy;
use crate::utils::errors::AppResult;
use crate::models::{
    Customer, Employee, Execution, ExecutionStatus, Part, PartUsage, PaymentMethod, Service,
    ServiceOrder, Vehicle,
};

/// Orden con sus referencias ya resueltas para mostrar
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOrderView {
    #[serde(flatten)]
    pub order: ServiceOrder,
    pub vehicle: Option<Vehicle>,
    pub customer: Option<Customer>,
    pub service: Option<Service>,
    pub employee: Option<Employee>,
}

impl ServiceOrderView {
    pub fn new(
        order: ServiceOrder,
        vehicle: Option<Vehicle>,
        customer: Option<Customer>,
        service: Option<Service>,
        employee: Option<Employee>,
    ) -> Self {
        Self {
            order,
            vehicle,
            customer,
            service,
            employee,
        }
    }
}

/// Pieza usada con nombre y total de línea
#[derive(Debug, Clone, Serialize)]
pub struct PartUsageView {
    #[serde(flatten)]
    pub usage: PartUsage,
    pub part_name: Option<String>,
    pub line_total: Decimal,
}

impl PartUsageView {
    pub fn new(usage: PartUsage, part: Option<&Part>) -> AppResult<Self> {
        let line_total = usage.line_total()?;
        Ok(Self {
            usage,
            part_name: part.map(|p| p.name.clone()),
            line_total,
        })
    }
}

/// Ejecución con estado y descuento derivados
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionView {
    #[serde(flatten)]
    pub execution: Execution,
    pub payment_method: Option<String>,
    pub status: ExecutionStatus,
    pub discounted_value: Option<Decimal>,
    pub effective_value: Decimal,
}

impl ExecutionView {
    /// Deriva estado y valor con descuento para la fecha `today`
    pub fn new(
        execution: Execution,
        payment_method: Option<&PaymentMethod>,
        discounts: &DiscountPolicy,
        today: NaiveDate,
    ) -> Self {
        let discounted_value =
            payment_method.and_then(|method| discounts.discounted_value(execution.value, method));
        Self {
            status: execution.status(today),
            effective_value: discounted_value.unwrap_or(execution.value),
            payment_method: payment_method.map(|m| m.description.clone()),
            discounted_value,
            execution,
        }
    }
}

/// Detalle completo de una orden
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOrderDetail {
    #[serde(flatten)]
    pub view: ServiceOrderView,
    pub parts: Vec<PartUsageView>,
    pub parts_total: Decimal,
    pub execution: Option<ExecutionView>,
}
