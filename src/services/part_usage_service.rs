//! Piezas usadas en órdenes de servicio
//!
//! Una pieza solo se acepta con cantidad positiva y fecha de uso igual o
//! posterior a la apertura de la orden.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::PartUsageView;
use crate::models::part_usage::AttachPartRequest;
use crate::models::{Part, PartUsage};
use crate::repositories::OrderRepository;
use crate::services::catalog_service::CatalogService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::money::{line_total, normalize_money};

#[derive(Clone)]
pub struct PartUsageService {
    catalog: CatalogService,
    orders: Arc<dyn OrderRepository>,
}

impl PartUsageService {
    pub fn new(catalog: CatalogService, orders: Arc<dyn OrderRepository>) -> Self {
        Self { catalog, orders }
    }

    /// Agregar una pieza a la orden
    ///
    /// Sin `unit_price` se toma el precio vigente de la pieza en el catálogo.
    pub async fn attach(
        &self,
        service_order_id: Uuid,
        request: AttachPartRequest,
    ) -> AppResult<PartUsageView> {
        let (order, part) = tokio::try_join!(
            self.orders.find_order(service_order_id),
            self.catalog.find::<Part>(request.part_id),
        )?;
        let order =
            order.ok_or_else(|| not_found_error("ServiceOrder", &service_order_id.to_string()))?;
        let part = part.ok_or_else(|| not_found_error("Part", &request.part_id.to_string()))?;

        if request.quantity <= 0 {
            warn!("⚠️ Cantidad inválida {} para la orden {}", request.quantity, order.id);
            return Err(AppError::InvalidQuantity(format!(
                "quantity must be greater than zero, got {}",
                request.quantity
            )));
        }

        if request.used_on < order.opened_on {
            warn!(
                "⚠️ Pieza con fecha {} anterior a la apertura {} de la orden {}",
                request.used_on, order.opened_on, order.id
            );
            return Err(AppError::DateOrderingViolation(format!(
                "used_on {} is before the order opening date {}",
                request.used_on, order.opened_on
            )));
        }

        let unit_price = match request.unit_price {
            Some(price) => normalize_money(price, "unit_price")?,
            None => part.price,
        };
        let total = line_total(request.quantity, unit_price)?;

        let usage = PartUsage {
            id: Uuid::new_v4(),
            service_order_id: order.id,
            part_id: part.id,
            quantity: request.quantity,
            unit_price,
            used_on: request.used_on,
            created_at: Utc::now(),
        };
        let created = self.orders.insert_part_usage(&usage).await?;

        info!(
            "🔩 {} x {} agregada a la orden {} (total {})",
            created.quantity,
            part.name,
            order.id,
            total
        );
        PartUsageView::new(created, Some(&part))
    }

    pub async fn detach(&self, id: Uuid) -> AppResult<()> {
        if !self.orders.delete_part_usage(id).await? {
            return Err(not_found_error("PartUsage", &id.to_string()));
        }
        info!("🗑️ Pieza usada {} eliminada", id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PartUsageView> {
        let usage = self
            .orders
            .find_part_usage(id)
            .await?
            .ok_or_else(|| not_found_error("PartUsage", &id.to_string()))?;
        let part = self.catalog.find::<Part>(usage.part_id).await?;
        PartUsageView::new(usage, part.as_ref())
    }

    /// Piezas de la orden en orden de inserción, con nombre resuelto
    pub async fn list_for_order(&self, service_order_id: Uuid) -> AppResult<Vec<PartUsageView>> {
        if self.orders.find_order(service_order_id).await?.is_none() {
            return Err(not_found_error("ServiceOrder", &service_order_id.to_string()));
        }

        let (usages, parts) = tokio::try_join!(
            self.orders.list_part_usages(service_order_id),
            self.catalog.list::<Part>(),
        )?;
        usages
            .into_iter()
            .map(|usage| {
                let part = parts.iter().find(|p| p.id == usage.part_id);
                PartUsageView::new(usage, part)
            })
            .collect()
    }
}
