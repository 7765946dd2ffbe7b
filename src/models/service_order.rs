//! Modelo de ServiceOrder
//!
//! Una orden de servicio representa un trabajo de reparación desde la
//! apertura hasta el cierre financiero (ver `execution`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Orden de servicio - mapea a la tabla service_orders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub opened_on: NaiveDate,
    pub vehicle_id: Uuid,
    pub service_id: Uuid,
    pub employee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request para abrir una orden de servicio
///
/// Sin `opened_on` la orden se abre con la fecha de hoy.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceOrderRequest {
    pub opened_on: Option<NaiveDate>,
    pub vehicle_id: Uuid,
    pub service_id: Uuid,
    pub employee_id: Uuid,
}

/// Cambios parciales sobre una orden existente
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceOrderRequest {
    pub opened_on: Option<NaiveDate>,
    pub vehicle_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

impl UpdateServiceOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.opened_on.is_none()
            && self.vehicle_id.is_none()
            && self.service_id.is_none()
            && self.employee_id.is_none()
    }
}

impl ServiceOrder {
    pub fn new(request: &CreateServiceOrderRequest, opened_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            opened_on,
            vehicle_id: request.vehicle_id,
            service_id: request.service_id,
            employee_id: request.employee_id,
            created_at: Utc::now(),
        }
    }

    /// Aplica los campos presentes del request
    pub fn apply(&mut self, changes: &UpdateServiceOrderRequest) {
        if let Some(opened_on) = changes.opened_on {
            self.opened_on = opened_on;
        }
        if let Some(vehicle_id) = changes.vehicle_id {
            self.vehicle_id = vehicle_id;
        }
        if let Some(service_id) = changes.service_id {
            self.service_id = service_id;
        }
        if let Some(employee_id) = changes.employee_id {
            self.employee_id = employee_id;
        }
    }
}
