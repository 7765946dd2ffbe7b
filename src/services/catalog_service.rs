//! Servicio de catálogos de referencia
//!
//! CRUD genérico sobre cualquier `CatalogEntity` más las consultas que el
//! motor de órdenes necesita: existencia de referencias, vehículos por
//! cliente y una foto completa de los catálogos para armar vistas y reportes.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::ServiceOrderView;
use crate::models::{
    CatalogEntity, Customer, Employee, EntityKind, EntityRef, Part, PaymentMethod, Service,
    ServiceOrder, Vehicle,
};
use crate::repositories::{CatalogRepository, CatalogStore, ReferenceResolver};
use crate::utils::errors::{not_found_error, reference_not_found_error, AppResult};

/// Catálogos indexados por id, leídos de una sola vez
#[derive(Debug, Default, Clone)]
pub struct CatalogSnapshot {
    pub customers: HashMap<Uuid, Customer>,
    pub vehicles: HashMap<Uuid, Vehicle>,
    pub employees: HashMap<Uuid, Employee>,
    pub parts: HashMap<Uuid, Part>,
    pub services: HashMap<Uuid, Service>,
    pub payment_methods: HashMap<Uuid, PaymentMethod>,
}

fn index<T: CatalogEntity>(rows: Vec<T>) -> HashMap<Uuid, T> {
    rows.into_iter().map(|row| (row.id(), row)).collect()
}

impl CatalogSnapshot {
    pub fn customer_of(&self, vehicle: &Vehicle) -> Option<&Customer> {
        self.customers.get(&vehicle.customer_id)
    }

    /// Resuelve vehículo, cliente, servicio y funcionario de la orden
    pub fn order_view(&self, order: ServiceOrder) -> ServiceOrderView {
        let vehicle = self.vehicles.get(&order.vehicle_id).cloned();
        let customer = vehicle
            .as_ref()
            .and_then(|v| self.customer_of(v))
            .cloned();
        let service = self.services.get(&order.service_id).cloned();
        let employee = self.employees.get(&order.employee_id).cloned();
        ServiceOrderView::new(order, vehicle, customer, service, employee)
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create<T>(&self, request: T::Create) -> AppResult<T>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        request.validate()?;
        let record = T::from_create(Uuid::new_v4(), request)?;
        self.ensure_references(&record.references()).await?;

        let created =
            <dyn CatalogStore as CatalogRepository<T>>::insert(self.store.as_ref(), &record).await?;
        info!("✅ {} creado: {}", T::KIND.label(), created.id());
        Ok(created)
    }

    pub async fn find<T>(&self, id: Uuid) -> AppResult<Option<T>>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        <dyn CatalogStore as CatalogRepository<T>>::find_by_id(self.store.as_ref(), id).await
    }

    pub async fn get<T>(&self, id: Uuid) -> AppResult<T>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        self.find::<T>(id)
            .await?
            .ok_or_else(|| not_found_error(T::KIND.label(), &id.to_string()))
    }

    pub async fn list<T>(&self) -> AppResult<Vec<T>>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        <dyn CatalogStore as CatalogRepository<T>>::list(self.store.as_ref()).await
    }

    pub async fn update<T>(&self, id: Uuid, request: T::Update) -> AppResult<T>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        request.validate()?;
        let mut record = self.get::<T>(id).await?;
        record.apply_update(request)?;
        self.ensure_references(&record.references()).await?;

        let updated =
            <dyn CatalogStore as CatalogRepository<T>>::update(self.store.as_ref(), &record)
                .await?
                .ok_or_else(|| not_found_error(T::KIND.label(), &id.to_string()))?;
        info!("✏️ {} actualizado: {}", T::KIND.label(), id);
        Ok(updated)
    }

    pub async fn delete<T>(&self, id: Uuid) -> AppResult<()>
    where
        T: CatalogEntity,
        dyn CatalogStore: CatalogRepository<T>,
    {
        let deleted =
            <dyn CatalogStore as CatalogRepository<T>>::delete(self.store.as_ref(), id).await?;
        if !deleted {
            return Err(not_found_error(T::KIND.label(), &id.to_string()));
        }
        info!("🗑️ {} eliminado: {}", T::KIND.label(), id);
        Ok(())
    }

    pub async fn exists(&self, reference: EntityRef) -> AppResult<bool> {
        self.store.exists(reference).await
    }

    /// Verifica todas las referencias en paralelo
    ///
    /// La primera que no resuelve se reporta como `ReferenceNotFound`.
    pub async fn ensure_references(&self, references: &[EntityRef]) -> AppResult<()> {
        if references.is_empty() {
            return Ok(());
        }

        let found = try_join_all(references.iter().map(|r| self.store.exists(*r))).await?;
        match references.iter().zip(found).find(|(_, exists)| !exists) {
            Some((missing, _)) => {
                warn!("⚠️ Referencia inexistente: {} {}", missing.kind.label(), missing.id);
                Err(reference_not_found_error(missing.kind.label(), &missing.id.to_string()))
            }
            None => Ok(()),
        }
    }

    pub async fn vehicles_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<Vehicle>> {
        if !self
            .exists(EntityRef::new(EntityKind::Customer, customer_id))
            .await?
        {
            return Err(not_found_error("Customer", &customer_id.to_string()));
        }
        self.store.vehicles_by_customer(customer_id).await
    }

    pub async fn snapshot(&self) -> AppResult<CatalogSnapshot> {
        let (customers, vehicles, employees, parts, services, payment_methods) = tokio::try_join!(
            self.list::<Customer>(),
            self.list::<Vehicle>(),
            self.list::<Employee>(),
            self.list::<Part>(),
            self.list::<Service>(),
            self.list::<PaymentMethod>(),
        )?;
        debug!(
            "📚 Catálogos cargados: {} clientes, {} vehículos, {} funcionarios",
            customers.len(),
            vehicles.len(),
            employees.len()
        );

        Ok(CatalogSnapshot {
            customers: index(customers),
            vehicles: index(vehicles),
            employees: index(employees),
            parts: index(parts),
            services: index(services),
            payment_methods: index(payment_methods),
        })
    }
}
