//! Capa de persistencia
//!
//! Traits de repositorio y sus dos implementaciones: `PgStore` (PostgreSQL)
//! e `InMemoryStore`.

pub mod catalog_repository;
pub mod memory_store;
pub mod order_repository;
pub mod pg_store;

pub use catalog_repository::{CatalogRepository, CatalogStore, ReferenceResolver};
pub use memory_store::InMemoryStore;
pub use order_repository::OrderRepository;
pub use pg_store::PgStore;
