//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean al schema
//! PostgreSQL: catálogos de referencia y el agregado de orden de servicio.

pub mod catalog;
pub mod customer;
pub mod employee;
pub mod execution;
pub mod part;
pub mod part_usage;
pub mod payment_method;
pub mod report;
pub mod service;
pub mod service_order;
pub mod vehicle;

pub use catalog::{CatalogEntity, EntityKind, EntityRef};
pub use customer::Customer;
pub use employee::Employee;
pub use execution::{Execution, ExecutionStatus};
pub use part::Part;
pub use part_usage::PartUsage;
pub use payment_method::PaymentMethod;
pub use service::Service;
pub use service_order::ServiceOrder;
pub use vehicle::Vehicle;
