//! Store en memoria
//!
//! Mismas reglas que el store de Postgres (claves foráneas restrictivas,
//! una ejecución por orden, chequeo de fecha atómico) sobre tablas
//! protegidas por `RwLock`. Los locks se toman siempre en el orden
//! catálogos → órdenes.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::report::DateRange;
use crate::models::{
    CatalogEntity, Customer, Employee, EntityKind, EntityRef, Execution, Part, PartUsage,
    PaymentMethod, Service, ServiceOrder, Vehicle,
};
use crate::repositories::catalog_repository::{CatalogRepository, ReferenceResolver};
use crate::repositories::order_repository::OrderRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

type CatalogTables = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

#[derive(Default)]
struct OrderTables {
    orders: Vec<ServiceOrder>,
    part_usages: Vec<PartUsage>,
    executions: Vec<Execution>,
}

#[derive(Default)]
pub struct InMemoryStore {
    catalogs: RwLock<CatalogTables>,
    tables: RwLock<OrderTables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn rows<T: CatalogEntity>(catalogs: &CatalogTables) -> &[T] {
    catalogs
        .get(&TypeId::of::<T>())
        .and_then(|table| table.downcast_ref::<Vec<T>>())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn rows_mut<T: CatalogEntity>(catalogs: &mut CatalogTables) -> AppResult<&mut Vec<T>> {
    catalogs
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(Vec::<T>::new()))
        .downcast_mut::<Vec<T>>()
        .ok_or_else(|| {
            AppError::Internal(format!("catalog table for {} has the wrong type", T::KIND.label()))
        })
}

fn contains<T: CatalogEntity>(catalogs: &CatalogTables, id: Uuid) -> bool {
    rows::<T>(catalogs).iter().any(|row| row.id() == id)
}

fn resolves(catalogs: &CatalogTables, reference: EntityRef) -> bool {
    match reference.kind {
        EntityKind::Customer => contains::<Customer>(catalogs, reference.id),
        EntityKind::Vehicle => contains::<Vehicle>(catalogs, reference.id),
        EntityKind::Employee => contains::<Employee>(catalogs, reference.id),
        EntityKind::Part => contains::<Part>(catalogs, reference.id),
        EntityKind::Service => contains::<Service>(catalogs, reference.id),
        EntityKind::PaymentMethod => contains::<PaymentMethod>(catalogs, reference.id),
    }
}

/// Equivalente a una violación de clave foránea en Postgres
fn require_all(catalogs: &CatalogTables, references: &[EntityRef]) -> AppResult<()> {
    match references.iter().find(|r| !resolves(catalogs, **r)) {
        Some(missing) => Err(AppError::Conflict(format!(
            "{} {} does not exist",
            missing.kind.label(),
            missing.id
        ))),
        None => Ok(()),
    }
}

/// Tabla que todavía apunta al registro, si existe alguna
fn referenced_by(
    catalogs: &CatalogTables,
    tables: &OrderTables,
    kind: EntityKind,
    id: Uuid,
) -> Option<&'static str> {
    let referenced = match kind {
        EntityKind::Customer => rows::<Vehicle>(catalogs).iter().any(|v| v.customer_id == id),
        EntityKind::Vehicle => tables.orders.iter().any(|o| o.vehicle_id == id),
        EntityKind::Employee => tables.orders.iter().any(|o| o.employee_id == id),
        EntityKind::Service => tables.orders.iter().any(|o| o.service_id == id),
        EntityKind::Part => tables.part_usages.iter().any(|u| u.part_id == id),
        EntityKind::PaymentMethod => tables.executions.iter().any(|e| e.payment_method_id == id),
    };
    if !referenced {
        return None;
    }
    Some(match kind {
        EntityKind::Customer => "vehicles",
        EntityKind::Vehicle | EntityKind::Employee | EntityKind::Service => "service_orders",
        EntityKind::Part => "part_usages",
        EntityKind::PaymentMethod => "executions",
    })
}

fn order_references(order: &ServiceOrder) -> [EntityRef; 3] {
    [
        EntityRef::new(EntityKind::Vehicle, order.vehicle_id),
        EntityRef::new(EntityKind::Service, order.service_id),
        EntityRef::new(EntityKind::Employee, order.employee_id),
    ]
}

fn newest_first(orders: &mut [ServiceOrder]) {
    orders.sort_by(|a, b| {
        b.opened_on
            .cmp(&a.opened_on)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl<T: CatalogEntity> CatalogRepository<T> for InMemoryStore {
    async fn insert(&self, record: &T) -> AppResult<T> {
        let mut catalogs = self.catalogs.write().await;
        require_all(&catalogs, &record.references())?;
        rows_mut::<T>(&mut catalogs)?.push(record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<T>> {
        let catalogs = self.catalogs.read().await;
        Ok(rows::<T>(&catalogs).iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<T>> {
        let catalogs = self.catalogs.read().await;
        Ok(rows::<T>(&catalogs).to_vec())
    }

    async fn update(&self, record: &T) -> AppResult<Option<T>> {
        let mut catalogs = self.catalogs.write().await;
        require_all(&catalogs, &record.references())?;
        let table = rows_mut::<T>(&mut catalogs)?;
        match table.iter_mut().find(|row| row.id() == record.id()) {
            Some(row) => {
                *row = record.clone();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut catalogs = self.catalogs.write().await;
        let tables = self.tables.read().await;

        if !contains::<T>(&catalogs, id) {
            return Ok(false);
        }
        if let Some(table) = referenced_by(&catalogs, &tables, T::KIND, id) {
            return Err(AppError::Conflict(format!("record is still referenced ({})", table)));
        }

        rows_mut::<T>(&mut catalogs)?.retain(|row| row.id() != id);
        Ok(true)
    }
}

#[async_trait]
impl ReferenceResolver for InMemoryStore {
    async fn exists(&self, reference: EntityRef) -> AppResult<bool> {
        let catalogs = self.catalogs.read().await;
        Ok(resolves(&catalogs, reference))
    }

    async fn vehicles_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let catalogs = self.catalogs.read().await;
        let mut vehicles: Vec<Vehicle> = rows::<Vehicle>(&catalogs)
            .iter()
            .filter(|v| v.customer_id == customer_id)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| a.license_plate.cmp(&b.license_plate));
        Ok(vehicles)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_order(&self, order: &ServiceOrder) -> AppResult<ServiceOrder> {
        let catalogs = self.catalogs.read().await;
        require_all(&catalogs, &order_references(order))?;
        let mut tables = self.tables.write().await;
        tables.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<ServiceOrder>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self) -> AppResult<Vec<ServiceOrder>> {
        let tables = self.tables.read().await;
        let mut orders = tables.orders.clone();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn list_open_orders(&self) -> AppResult<Vec<ServiceOrder>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<ServiceOrder> = tables
            .orders
            .iter()
            .filter(|o| !tables.executions.iter().any(|e| e.service_order_id == o.id))
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn update_order(&self, order: &ServiceOrder) -> AppResult<Option<ServiceOrder>> {
        let catalogs = self.catalogs.read().await;
        require_all(&catalogs, &order_references(order))?;
        let mut tables = self.tables.write().await;

        if !tables.orders.iter().any(|o| o.id == order.id) {
            return Ok(None);
        }
        if tables
            .part_usages
            .iter()
            .any(|u| u.service_order_id == order.id && u.used_on < order.opened_on)
        {
            return Err(AppError::DateOrderingViolation(format!(
                "opened_on {} is after a part already used on order {}",
                order.opened_on, order.id
            )));
        }

        if let Some(row) = tables.orders.iter_mut().find(|o| o.id == order.id) {
            row.opened_on = order.opened_on;
            row.vehicle_id = order.vehicle_id;
            row.service_id = order.service_id;
            row.employee_id = order.employee_id;
            return Ok(Some(row.clone()));
        }
        Ok(None)
    }

    async fn delete_order_cascade(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;

        if !tables.orders.iter().any(|o| o.id == id) {
            return Ok(false);
        }
        if tables.executions.iter().any(|e| e.service_order_id == id) {
            return Err(AppError::Conflict("record is still referenced (executions)".to_string()));
        }

        tables.part_usages.retain(|u| u.service_order_id != id);
        tables.orders.retain(|o| o.id != id);
        Ok(true)
    }

    async fn insert_part_usage(&self, usage: &PartUsage) -> AppResult<PartUsage> {
        let catalogs = self.catalogs.read().await;
        require_all(&catalogs, &[EntityRef::new(EntityKind::Part, usage.part_id)])?;
        let mut tables = self.tables.write().await;

        let order = tables
            .orders
            .iter()
            .find(|o| o.id == usage.service_order_id)
            .ok_or_else(|| not_found_error("ServiceOrder", &usage.service_order_id.to_string()))?;
        if usage.used_on < order.opened_on {
            return Err(AppError::DateOrderingViolation(format!(
                "part used on {} before order opened on {}",
                usage.used_on, order.opened_on
            )));
        }

        tables.part_usages.push(usage.clone());
        Ok(usage.clone())
    }

    async fn find_part_usage(&self, id: Uuid) -> AppResult<Option<PartUsage>> {
        let tables = self.tables.read().await;
        Ok(tables.part_usages.iter().find(|u| u.id == id).cloned())
    }

    async fn list_part_usages(&self, service_order_id: Uuid) -> AppResult<Vec<PartUsage>> {
        let tables = self.tables.read().await;
        Ok(tables
            .part_usages
            .iter()
            .filter(|u| u.service_order_id == service_order_id)
            .cloned()
            .collect())
    }

    async fn delete_part_usage(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.part_usages.len();
        tables.part_usages.retain(|u| u.id != id);
        Ok(tables.part_usages.len() < before)
    }

    async fn insert_execution(&self, execution: &Execution) -> AppResult<Execution> {
        let catalogs = self.catalogs.read().await;
        require_all(
            &catalogs,
            &[EntityRef::new(EntityKind::PaymentMethod, execution.payment_method_id)],
        )?;
        let mut tables = self.tables.write().await;

        if !tables.orders.iter().any(|o| o.id == execution.service_order_id) {
            return Err(AppError::Conflict(format!(
                "ServiceOrder {} does not exist",
                execution.service_order_id
            )));
        }
        if tables
            .executions
            .iter()
            .any(|e| e.service_order_id == execution.service_order_id)
        {
            return Err(AppError::AlreadyFinalized(
                "service order already has an execution".to_string(),
            ));
        }

        tables.executions.push(execution.clone());
        Ok(execution.clone())
    }

    async fn find_execution(&self, id: Uuid) -> AppResult<Option<Execution>> {
        let tables = self.tables.read().await;
        Ok(tables.executions.iter().find(|e| e.id == id).cloned())
    }

    async fn find_execution_by_order(&self, service_order_id: Uuid) -> AppResult<Option<Execution>> {
        let tables = self.tables.read().await;
        Ok(tables
            .executions
            .iter()
            .find(|e| e.service_order_id == service_order_id)
            .cloned())
    }

    async fn list_executions(&self) -> AppResult<Vec<Execution>> {
        let tables = self.tables.read().await;
        let mut executions = tables.executions.clone();
        executions.sort_by(|a, b| {
            b.finalized_on
                .cmp(&a.finalized_on)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(executions)
    }

    async fn update_execution(&self, execution: &Execution) -> AppResult<Option<Execution>> {
        let catalogs = self.catalogs.read().await;
        require_all(
            &catalogs,
            &[EntityRef::new(EntityKind::PaymentMethod, execution.payment_method_id)],
        )?;
        let mut tables = self.tables.write().await;

        match tables.executions.iter_mut().find(|e| e.id == execution.id) {
            Some(row) => {
                row.value = execution.value;
                row.finalized_on = execution.finalized_on;
                row.payment_method_id = execution.payment_method_id;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_execution(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.executions.len();
        tables.executions.retain(|e| e.id != id);
        Ok(tables.executions.len() < before)
    }

    async fn orders_opened_between(&self, range: DateRange) -> AppResult<Vec<ServiceOrder>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<ServiceOrder> = tables
            .orders
            .iter()
            .filter(|o| range.contains(o.opened_on))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.opened_on.cmp(&b.opened_on).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(orders)
    }

    async fn part_usages_between(&self, range: DateRange) -> AppResult<Vec<PartUsage>> {
        let tables = self.tables.read().await;
        let mut usages: Vec<PartUsage> = tables
            .part_usages
            .iter()
            .filter(|u| range.contains(u.used_on))
            .cloned()
            .collect();
        usages.sort_by(|a, b| a.used_on.cmp(&b.used_on).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(usages)
    }

    async fn executions_finalized_between(&self, range: DateRange) -> AppResult<Vec<Execution>> {
        let tables = self.tables.read().await;
        let mut executions: Vec<Execution> = tables
            .executions
            .iter()
            .filter(|e| range.contains(e.finalized_on))
            .cloned()
            .collect();
        executions.sort_by(|a, b| {
            a.finalized_on
                .cmp(&b.finalized_on)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(executions)
    }

    async fn executions_for_orders(&self, service_order_ids: &[Uuid]) -> AppResult<Vec<Execution>> {
        let tables = self.tables.read().await;
        Ok(tables
            .executions
            .iter()
            .filter(|e| service_order_ids.contains(&e.service_order_id))
            .cloned()
            .collect())
    }
}
