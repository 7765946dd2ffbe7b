//! Finalización de órdenes
//!
//! Una orden se cierra con exactamente una ejecución. El estado y el valor
//! con descuento se derivan en cada lectura a partir de `today` y de la
//! tabla de descuentos configurada.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DiscountPolicy;
use crate::dto::ExecutionView;
use crate::models::execution::{FinalizeOrderRequest, UpdateExecutionRequest};
use crate::models::{EntityKind, EntityRef, Execution, PaymentMethod, Service};
use crate::repositories::OrderRepository;
use crate::services::catalog_service::CatalogService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::money::normalize_money;

#[derive(Clone)]
pub struct ExecutionService {
    catalog: CatalogService,
    orders: Arc<dyn OrderRepository>,
    discounts: Arc<DiscountPolicy>,
}

impl ExecutionService {
    pub fn new(
        catalog: CatalogService,
        orders: Arc<dyn OrderRepository>,
        discounts: Arc<DiscountPolicy>,
    ) -> Self {
        Self {
            catalog,
            orders,
            discounts,
        }
    }

    /// Cerrar una orden abierta
    ///
    /// Sin `value` se usa el precio de mano de obra del servicio de la orden.
    pub async fn finalize(
        &self,
        request: FinalizeOrderRequest,
        today: NaiveDate,
    ) -> AppResult<ExecutionView> {
        let (order, method) = tokio::try_join!(
            self.orders.find_order(request.service_order_id),
            self.catalog.find::<PaymentMethod>(request.payment_method_id),
        )?;
        let order = order
            .ok_or_else(|| not_found_error("ServiceOrder", &request.service_order_id.to_string()))?;
        let method = method.ok_or_else(|| {
            not_found_error("PaymentMethod", &request.payment_method_id.to_string())
        })?;

        if let Some(existing) = self.orders.find_execution_by_order(order.id).await? {
            warn!("⚠️ Orden {} ya finalizada por {}", order.id, existing.id);
            return Err(AppError::AlreadyFinalized(format!(
                "service order {} already has execution {}",
                order.id, existing.id
            )));
        }

        let value = match request.value {
            Some(value) => normalize_money(value, "value")?,
            None => self.catalog.get::<Service>(order.service_id).await?.labor_price,
        };

        let execution = Execution {
            id: Uuid::new_v4(),
            service_order_id: order.id,
            value,
            finalized_on: request.finalized_on,
            payment_method_id: method.id,
            created_at: Utc::now(),
        };
        let created = self.orders.insert_execution(&execution).await?;

        let view = ExecutionView::new(created, Some(&method), &self.discounts, today);
        info!(
            "💰 Orden {} finalizada: valor {}, {} ({:?})",
            order.id, view.execution.value, method.description, view.status
        );
        Ok(view)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateExecutionRequest,
        today: NaiveDate,
    ) -> AppResult<ExecutionView> {
        let mut execution = self.find(id).await?;

        if let Some(value) = changes.value {
            execution.value = normalize_money(value, "value")?;
        }
        if let Some(finalized_on) = changes.finalized_on {
            execution.finalized_on = finalized_on;
        }
        if let Some(payment_method_id) = changes.payment_method_id {
            self.catalog
                .ensure_references(&[EntityRef::new(EntityKind::PaymentMethod, payment_method_id)])
                .await?;
            execution.payment_method_id = payment_method_id;
        }

        let updated = self
            .orders
            .update_execution(&execution)
            .await?
            .ok_or_else(|| not_found_error("Execution", &id.to_string()))?;

        info!("✏️ Ejecución {} actualizada", id);
        self.view(updated, today).await
    }

    /// Borra la ejecución y la orden vuelve a quedar abierta
    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        let execution = self.find(id).await?;
        if !self.orders.delete_execution(id).await? {
            return Err(not_found_error("Execution", &id.to_string()));
        }
        info!(
            "↩️ Ejecución {} eliminada, orden {} reabierta",
            id, execution.service_order_id
        );
        Ok(())
    }

    pub async fn get(&self, id: Uuid, today: NaiveDate) -> AppResult<ExecutionView> {
        let execution = self.find(id).await?;
        self.view(execution, today).await
    }

    pub async fn list(&self, today: NaiveDate) -> AppResult<Vec<ExecutionView>> {
        let (executions, methods) = tokio::try_join!(
            self.orders.list_executions(),
            self.catalog.list::<PaymentMethod>(),
        )?;
        Ok(executions
            .into_iter()
            .map(|execution| {
                let method = methods.iter().find(|m| m.id == execution.payment_method_id);
                ExecutionView::new(execution, method, &self.discounts, today)
            })
            .collect())
    }

    async fn find(&self, id: Uuid) -> AppResult<Execution> {
        self.orders
            .find_execution(id)
            .await?
            .ok_or_else(|| not_found_error("Execution", &id.to_string()))
    }

    async fn view(&self, execution: Execution, today: NaiveDate) -> AppResult<ExecutionView> {
        let method = self
            .catalog
            .find::<PaymentMethod>(execution.payment_method_id)
            .await?;
        Ok(ExecutionView::new(execution, method.as_ref(), &self.discounts, today))
    }
}
