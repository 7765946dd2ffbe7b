//! Repositorio de catálogos de referencia
//!
//! `CatalogRepository<T>` da CRUD genérico para cualquier `CatalogEntity`.
//! La implementación de Postgres arma el SQL a partir de `COLUMNS`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    CatalogEntity, Customer, Employee, EntityRef, Part, PaymentMethod, Service, Vehicle,
};
use crate::repositories::pg_store::PgStore;
use crate::utils::errors::{map_constraint_error, AppResult};

#[async_trait]
pub trait CatalogRepository<T: CatalogEntity>: Send + Sync {
    async fn insert(&self, record: &T) -> AppResult<T>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<T>>;

    async fn list(&self) -> AppResult<Vec<T>>;

    /// Reemplaza el registro; `None` si no existe
    async fn update(&self, record: &T) -> AppResult<Option<T>>;

    /// `false` si no existía
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Consultas de catálogo que no dependen del tipo
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    async fn exists(&self, reference: EntityRef) -> AppResult<bool>;

    async fn vehicles_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<Vehicle>>;
}

/// Todos los catálogos más las consultas de referencia
pub trait CatalogStore:
    CatalogRepository<Customer>
    + CatalogRepository<Vehicle>
    + CatalogRepository<Employee>
    + CatalogRepository<Part>
    + CatalogRepository<Service>
    + CatalogRepository<PaymentMethod>
    + ReferenceResolver
{
}

impl<S> CatalogStore for S where
    S: CatalogRepository<Customer>
        + CatalogRepository<Vehicle>
        + CatalogRepository<Employee>
        + CatalogRepository<Part>
        + CatalogRepository<Service>
        + CatalogRepository<PaymentMethod>
        + ReferenceResolver
{
}

fn placeholders(from: usize, count: usize) -> Vec<String> {
    (from..from + count).map(|i| format!("${}", i)).collect()
}

fn insert_sql<T: CatalogEntity>() -> String {
    format!(
        "INSERT INTO {} (id, {}) VALUES ($1, {}) RETURNING *",
        T::KIND.table(),
        T::COLUMNS.join(", "),
        placeholders(2, T::COLUMNS.len()).join(", ")
    )
}

fn update_sql<T: CatalogEntity>() -> String {
    let assignments: Vec<String> = T::COLUMNS
        .iter()
        .zip(placeholders(2, T::COLUMNS.len()))
        .map(|(column, placeholder)| format!("{} = {}", column, placeholder))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = $1 RETURNING *",
        T::KIND.table(),
        assignments.join(", ")
    )
}

#[async_trait]
impl<T: CatalogEntity> CatalogRepository<T> for PgStore {
    async fn insert(&self, record: &T) -> AppResult<T> {
        let sql = insert_sql::<T>();
        let query = sqlx::query_as::<_, T>(&sql).bind(record.id());
        let created = record
            .bind_columns(query)
            .fetch_one(self.pool())
            .await
            .map_err(map_constraint_error)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::KIND.table());
        let record = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(record)
    }

    async fn list(&self) -> AppResult<Vec<T>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", T::KIND.table(), T::ORDER_BY);
        let records = sqlx::query_as::<_, T>(&sql).fetch_all(self.pool()).await?;
        Ok(records)
    }

    async fn update(&self, record: &T) -> AppResult<Option<T>> {
        let sql = update_sql::<T>();
        let query = sqlx::query_as::<_, T>(&sql).bind(record.id());
        let updated = record
            .bind_columns(query)
            .fetch_optional(self.pool())
            .await
            .map_err(map_constraint_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::KIND.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_constraint_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReferenceResolver for PgStore {
    async fn exists(&self, reference: EntityRef) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            reference.kind.table()
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(reference.id)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }

    async fn vehicles_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE customer_id = $1 ORDER BY license_plate",
        )
        .bind(customer_id)
        .fetch_all(self.pool())
        .await?;
        Ok(vehicles)
    }
}
