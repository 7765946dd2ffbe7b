//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{CatalogStore, InMemoryStore, OrderRepository};
use crate::services::{
    CatalogService, ExecutionService, PartUsageService, ReportService, ServiceOrderService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub catalog: CatalogService,
    pub service_orders: ServiceOrderService,
    pub part_usages: PartUsageService,
    pub executions: ExecutionService,
    pub reports: ReportService,
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    /// Armar los servicios sobre un store que implementa todos los repositorios
    pub fn new<S>(store: Arc<S>, config: EnvironmentConfig) -> Self
    where
        S: CatalogStore + OrderRepository + 'static,
    {
        let catalog_store: Arc<dyn CatalogStore> = store.clone();
        let orders: Arc<dyn OrderRepository> = store;
        let discounts = Arc::new(config.discounts.clone());
        let catalog = CatalogService::new(catalog_store);

        Self {
            service_orders: ServiceOrderService::new(
                catalog.clone(),
                orders.clone(),
                discounts.clone(),
            ),
            part_usages: PartUsageService::new(catalog.clone(), orders.clone()),
            executions: ExecutionService::new(catalog.clone(), orders.clone(), discounts.clone()),
            reports: ReportService::new(catalog.clone(), orders, discounts),
            catalog,
            config,
            fixed_today: None,
        }
    }

    /// Estado con el store en memoria
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    /// Fija la fecha usada para derivar estados
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Fecha de hoy según el reloj local
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}
