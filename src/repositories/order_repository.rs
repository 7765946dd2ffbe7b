//! Repositorio del agregado de orden de servicio
//!
//! Órdenes, piezas usadas y ejecuciones. Las escrituras que deben ser
//! atómicas (borrado en cascada, uso de pieza con chequeo de fecha,
//! ejecución única por orden) se resuelven dentro del propio store.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::models::report::DateRange;
use crate::models::{Execution, PartUsage, ServiceOrder};
use crate::repositories::pg_store::PgStore;
use crate::utils::errors::{map_constraint_error, not_found_error, AppError, AppResult};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: &ServiceOrder) -> AppResult<ServiceOrder>;

    async fn find_order(&self, id: Uuid) -> AppResult<Option<ServiceOrder>>;

    async fn list_orders(&self) -> AppResult<Vec<ServiceOrder>>;

    /// Órdenes sin ejecución asociada
    async fn list_open_orders(&self) -> AppResult<Vec<ServiceOrder>>;

    /// Falla con `DateOrderingViolation` si el nuevo `opened_on` queda
    /// después de alguna pieza ya usada; `None` si la orden no existe
    async fn update_order(&self, order: &ServiceOrder) -> AppResult<Option<ServiceOrder>>;

    /// Borra la orden y sus piezas en una sola unidad
    async fn delete_order_cascade(&self, id: Uuid) -> AppResult<bool>;

    /// Inserta solo si la orden existe y `used_on >= opened_on`
    async fn insert_part_usage(&self, usage: &PartUsage) -> AppResult<PartUsage>;

    async fn find_part_usage(&self, id: Uuid) -> AppResult<Option<PartUsage>>;

    async fn list_part_usages(&self, service_order_id: Uuid) -> AppResult<Vec<PartUsage>>;

    async fn delete_part_usage(&self, id: Uuid) -> AppResult<bool>;

    /// Falla con `AlreadyFinalized` si la orden ya tiene ejecución
    async fn insert_execution(&self, execution: &Execution) -> AppResult<Execution>;

    async fn find_execution(&self, id: Uuid) -> AppResult<Option<Execution>>;

    async fn find_execution_by_order(&self, service_order_id: Uuid) -> AppResult<Option<Execution>>;

    async fn list_executions(&self) -> AppResult<Vec<Execution>>;

    async fn update_execution(&self, execution: &Execution) -> AppResult<Option<Execution>>;

    async fn delete_execution(&self, id: Uuid) -> AppResult<bool>;

    async fn orders_opened_between(&self, range: DateRange) -> AppResult<Vec<ServiceOrder>>;

    async fn part_usages_between(&self, range: DateRange) -> AppResult<Vec<PartUsage>>;

    async fn executions_finalized_between(&self, range: DateRange) -> AppResult<Vec<Execution>>;

    async fn executions_for_orders(&self, service_order_ids: &[Uuid]) -> AppResult<Vec<Execution>>;
}

/// Bloquea la fila de la orden hasta el fin de la transacción
///
/// Toda escritura que compara `opened_on` con `used_on` pasa por aquí, así
/// que un cambio de fecha y un uso de pieza sobre la misma orden se serializan.
async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<ServiceOrder>, sqlx::Error> {
    sqlx::query_as::<_, ServiceOrder>("SELECT * FROM service_orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert_order(&self, order: &ServiceOrder) -> AppResult<ServiceOrder> {
        let created = sqlx::query_as::<_, ServiceOrder>(
            r#"
            INSERT INTO service_orders (id, opened_on, vehicle_id, service_id, employee_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.opened_on)
        .bind(order.vehicle_id)
        .bind(order.service_id)
        .bind(order.employee_id)
        .bind(order.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_constraint_error)?;

        Ok(created)
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<ServiceOrder>> {
        let order = sqlx::query_as::<_, ServiceOrder>("SELECT * FROM service_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(order)
    }

    async fn list_orders(&self) -> AppResult<Vec<ServiceOrder>> {
        let orders = sqlx::query_as::<_, ServiceOrder>(
            "SELECT * FROM service_orders ORDER BY opened_on DESC, created_at DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(orders)
    }

    async fn list_open_orders(&self) -> AppResult<Vec<ServiceOrder>> {
        let orders = sqlx::query_as::<_, ServiceOrder>(
            r#"
            SELECT so.* FROM service_orders so
            WHERE NOT EXISTS (
                SELECT 1 FROM executions e WHERE e.service_order_id = so.id
            )
            ORDER BY so.opened_on DESC, so.created_at DESC
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(orders)
    }

    async fn update_order(&self, order: &ServiceOrder) -> AppResult<Option<ServiceOrder>> {
        let mut tx = self.pool().begin().await?;

        if lock_order(&mut tx, order.id).await?.is_none() {
            return Ok(None);
        }

        let earlier_part: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM part_usages WHERE service_order_id = $1 AND used_on < $2 LIMIT 1",
        )
        .bind(order.id)
        .bind(order.opened_on)
        .fetch_optional(&mut *tx)
        .await?;
        if earlier_part.is_some() {
            return Err(AppError::DateOrderingViolation(format!(
                "opened_on {} is after a part already used on order {}",
                order.opened_on, order.id
            )));
        }

        let updated = sqlx::query_as::<_, ServiceOrder>(
            r#"
            UPDATE service_orders
            SET opened_on = $2, vehicle_id = $3, service_id = $4, employee_id = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.opened_on)
        .bind(order.vehicle_id)
        .bind(order.service_id)
        .bind(order.employee_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_order_cascade(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool().begin().await?;

        if lock_order(&mut tx, id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM part_usages WHERE service_order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM service_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_part_usage(&self, usage: &PartUsage) -> AppResult<PartUsage> {
        let mut tx = self.pool().begin().await?;

        let order = lock_order(&mut tx, usage.service_order_id)
            .await?
            .ok_or_else(|| not_found_error("ServiceOrder", &usage.service_order_id.to_string()))?;
        if usage.used_on < order.opened_on {
            return Err(AppError::DateOrderingViolation(format!(
                "part used on {} before order opened on {}",
                usage.used_on, order.opened_on
            )));
        }

        let created = sqlx::query_as::<_, PartUsage>(
            r#"
            INSERT INTO part_usages (id, service_order_id, part_id, quantity, unit_price, used_on, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(usage.id)
        .bind(usage.service_order_id)
        .bind(usage.part_id)
        .bind(usage.quantity)
        .bind(usage.unit_price)
        .bind(usage.used_on)
        .bind(usage.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_part_usage(&self, id: Uuid) -> AppResult<Option<PartUsage>> {
        let usage = sqlx::query_as::<_, PartUsage>("SELECT * FROM part_usages WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(usage)
    }

    async fn list_part_usages(&self, service_order_id: Uuid) -> AppResult<Vec<PartUsage>> {
        let usages = sqlx::query_as::<_, PartUsage>(
            "SELECT * FROM part_usages WHERE service_order_id = $1 ORDER BY created_at",
        )
        .bind(service_order_id)
        .fetch_all(self.pool())
        .await?;
        Ok(usages)
    }

    async fn delete_part_usage(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM part_usages WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_execution(&self, execution: &Execution) -> AppResult<Execution> {
        let created = sqlx::query_as::<_, Execution>(
            r#"
            INSERT INTO executions (id, service_order_id, value, finalized_on, payment_method_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(execution.id)
        .bind(execution.service_order_id)
        .bind(execution.value)
        .bind(execution.finalized_on)
        .bind(execution.payment_method_id)
        .bind(execution.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_constraint_error)?;

        Ok(created)
    }

    async fn find_execution(&self, id: Uuid) -> AppResult<Option<Execution>> {
        let execution = sqlx::query_as::<_, Execution>("SELECT * FROM executions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(execution)
    }

    async fn find_execution_by_order(&self, service_order_id: Uuid) -> AppResult<Option<Execution>> {
        let execution = sqlx::query_as::<_, Execution>(
            "SELECT * FROM executions WHERE service_order_id = $1",
        )
        .bind(service_order_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(execution)
    }

    async fn list_executions(&self) -> AppResult<Vec<Execution>> {
        let executions = sqlx::query_as::<_, Execution>(
            "SELECT * FROM executions ORDER BY finalized_on DESC, created_at DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(executions)
    }

    async fn update_execution(&self, execution: &Execution) -> AppResult<Option<Execution>> {
        let updated = sqlx::query_as::<_, Execution>(
            r#"
            UPDATE executions
            SET value = $2, finalized_on = $3, payment_method_id = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(execution.id)
        .bind(execution.value)
        .bind(execution.finalized_on)
        .bind(execution.payment_method_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_constraint_error)?;
        Ok(updated)
    }

    async fn delete_execution(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM executions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn orders_opened_between(&self, range: DateRange) -> AppResult<Vec<ServiceOrder>> {
        let orders = sqlx::query_as::<_, ServiceOrder>(
            r#"
            SELECT * FROM service_orders
            WHERE opened_on BETWEEN $1 AND $2
            ORDER BY opened_on, created_at
            "#,
        )
        .bind(range.start_date)
        .bind(range.end_date)
        .fetch_all(self.pool())
        .await?;
        Ok(orders)
    }

    async fn part_usages_between(&self, range: DateRange) -> AppResult<Vec<PartUsage>> {
        let usages = sqlx::query_as::<_, PartUsage>(
            r#"
            SELECT * FROM part_usages
            WHERE used_on BETWEEN $1 AND $2
            ORDER BY used_on, created_at
            "#,
        )
        .bind(range.start_date)
        .bind(range.end_date)
        .fetch_all(self.pool())
        .await?;
        Ok(usages)
    }

    async fn executions_finalized_between(&self, range: DateRange) -> AppResult<Vec<Execution>> {
        let executions = sqlx::query_as::<_, Execution>(
            r#"
            SELECT * FROM executions
            WHERE finalized_on BETWEEN $1 AND $2
            ORDER BY finalized_on, created_at
            "#,
        )
        .bind(range.start_date)
        .bind(range.end_date)
        .fetch_all(self.pool())
        .await?;
        Ok(executions)
    }

    async fn executions_for_orders(&self, service_order_ids: &[Uuid]) -> AppResult<Vec<Execution>> {
        if service_order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let executions = sqlx::query_as::<_, Execution>(
            "SELECT * FROM executions WHERE service_order_id = ANY($1)",
        )
        .bind(service_order_ids.to_vec())
        .fetch_all(self.pool())
        .await?;
        Ok(executions)
    }
}
