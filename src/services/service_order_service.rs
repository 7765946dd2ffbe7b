//! Gestión de órdenes de servicio
//!
//! Apertura, edición, borrado y lectura de órdenes. Toda regla de negocio se
//! verifica aquí antes de escribir; el store vuelve a garantizar las que
//! deben ser atómicas.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DiscountPolicy;
use crate::dto::{ExecutionView, PartUsageView, ServiceOrderDetail, ServiceOrderView};
use crate::models::part_usage::parts_total;
use crate::models::service_order::{CreateServiceOrderRequest, UpdateServiceOrderRequest};
use crate::models::{EntityKind, EntityRef, ServiceOrder};
use crate::repositories::OrderRepository;
use crate::services::catalog_service::CatalogService;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct ServiceOrderService {
    catalog: CatalogService,
    orders: Arc<dyn OrderRepository>,
    discounts: Arc<DiscountPolicy>,
}

impl ServiceOrderService {
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

    /// Abrir una orden; sin fecha se abre con `today`
    pub async fn create(
        &self,
        request: CreateServiceOrderRequest,
        today: NaiveDate,
    ) -> AppResult<ServiceOrderView> {
        self.catalog
            .ensure_references(&[
                EntityRef::new(EntityKind::Vehicle, request.vehicle_id),
                EntityRef::new(EntityKind::Service, request.service_id),
                EntityRef::new(EntityKind::Employee, request.employee_id),
            ])
            .await?;

        let opened_on = request.opened_on.unwrap_or(today);
        let order = ServiceOrder::new(&request, opened_on);
        let created = self.orders.insert_order(&order).await?;

        info!(
            "📋 Orden {} abierta el {} (vehículo {})",
            created.id, created.opened_on, created.vehicle_id
        );
        self.view(created).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateServiceOrderRequest,
    ) -> AppResult<ServiceOrderView> {
        let mut order = self.find(id).await?;

        let mut references = Vec::new();
        if let Some(vehicle_id) = changes.vehicle_id {
            references.push(EntityRef::new(EntityKind::Vehicle, vehicle_id));
        }
        if let Some(service_id) = changes.service_id {
            references.push(EntityRef::new(EntityKind::Service, service_id));
        }
        if let Some(employee_id) = changes.employee_id {
            references.push(EntityRef::new(EntityKind::Employee, employee_id));
        }
        self.catalog.ensure_references(&references).await?;

        if let Some(opened_on) = changes.opened_on {
            let usages = self.orders.list_part_usages(id).await?;
            if let Some(earliest) = usages.iter().map(|u| u.used_on).min() {
                if opened_on > earliest {
                    warn!(
                        "⚠️ Orden {}: apertura {} posterior a pieza usada el {}",
                        id, opened_on, earliest
                    );
                    return Err(AppError::DateOrderingViolation(format!(
                        "opened_on {} is after part usage dated {}",
                        opened_on, earliest
                    )));
                }
            }
        }

        order.apply(&changes);
        let updated = self
            .orders
            .update_order(&order)
            .await?
            .ok_or_else(|| not_found_error("ServiceOrder", &id.to_string()))?;

        info!("✏️ Orden {} actualizada", id);
        self.view(updated).await
    }

    /// Borra la orden y sus piezas; con ejecución existente se rechaza
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.find(id).await?;

        if let Some(execution) = self.orders.find_execution_by_order(id).await? {
            warn!("⚠️ Orden {} tiene la ejecución {}, no se borra", id, execution.id);
            return Err(AppError::OrderHasExecution(format!(
                "service order {} has execution {}; remove the execution first",
                id, execution.id
            )));
        }

        if !self.orders.delete_order_cascade(id).await? {
            return Err(not_found_error("ServiceOrder", &id.to_string()));
        }
        info!("🗑️ Orden {} eliminada junto con sus piezas", id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid, today: NaiveDate) -> AppResult<ServiceOrderDetail> {
        let order = self.find(id).await?;
        let (snapshot, usages, execution) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.list_part_usages(id),
            self.orders.find_execution_by_order(id),
        )?;

        let total = parts_total(&usages)?;
        let parts = usages
            .into_iter()
            .map(|usage| {
                let part = snapshot.parts.get(&usage.part_id);
                PartUsageView::new(usage, part)
            })
            .collect::<AppResult<Vec<_>>>()?;
        let execution = execution.map(|execution| {
            let method = snapshot.payment_methods.get(&execution.payment_method_id);
            ExecutionView::new(execution, method, &self.discounts, today)
        });

        Ok(ServiceOrderDetail {
            view: snapshot.order_view(order),
            parts,
            parts_total: total,
            execution,
        })
    }

    /// Todas las órdenes con referencias resueltas
    pub async fn list(&self) -> AppResult<Vec<ServiceOrderView>> {
        let (snapshot, orders) =
            tokio::try_join!(self.catalog.snapshot(), self.orders.list_orders())?;
        Ok(orders.into_iter().map(|o| snapshot.order_view(o)).collect())
    }

    /// Órdenes sin ejecución: candidatas a finalizar
    pub async fn list_open(&self) -> AppResult<Vec<ServiceOrderView>> {
        let (snapshot, orders) =
            tokio::try_join!(self.catalog.snapshot(), self.orders.list_open_orders())?;
        Ok(orders.into_iter().map(|o| snapshot.order_view(o)).collect())
    }

    async fn find(&self, id: Uuid) -> AppResult<ServiceOrder> {
        self.orders
            .find_order(id)
            .await?
            .ok_or_else(|| not_found_error("ServiceOrder", &id.to_string()))
    }

    async fn view(&self, order: ServiceOrder) -> AppResult<ServiceOrderView> {
        let snapshot = self.catalog.snapshot().await?;
        Ok(snapshot.order_view(order))
    }
}
