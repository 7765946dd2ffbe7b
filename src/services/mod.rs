//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: catálogos,
//! ciclo de vida de la orden de servicio y reportes.

pub mod catalog_service;
pub mod execution_service;
pub mod part_usage_service;
pub mod report_service;
pub mod service_order_service;

pub use catalog_service::{CatalogService, CatalogSnapshot};
pub use execution_service::ExecutionService;
pub use part_usage_service::PartUsageService;
pub use report_service::ReportService;
pub use service_order_service::ServiceOrderService;
