//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Cada vehículo pertenece a un cliente.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogEntity, EntityKind, EntityRef, PgQueryAs};
use crate::utils::errors::AppResult;
use crate::utils::validation::validate_license_plate;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub license_plate: String,
    pub fuel_type: Option<String>,
    pub chassis_number: Option<String>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 2, max = 100))]
    pub brand: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(length(max = 40))]
    pub chassis_number: Option<String>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    pub customer_id: Option<Uuid>,

    #[validate(length(min = 2, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(length(max = 40))]
    pub chassis_number: Option<String>,
}

impl CatalogEntity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "brand",
        "model",
        "year",
        "license_plate",
        "fuel_type",
        "chassis_number",
    ];
    const ORDER_BY: &'static str = "license_plate";

    type Create = CreateVehicleRequest;
    type Update = UpdateVehicleRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(id: Uuid, request: CreateVehicleRequest) -> AppResult<Self> {
        Ok(Self {
            id,
            customer_id: request.customer_id,
            brand: request.brand,
            model: request.model,
            year: request.year,
            license_plate: request.license_plate.trim().to_uppercase(),
            fuel_type: request.fuel_type,
            chassis_number: request.chassis_number,
        })
    }

    fn apply_update(&mut self, request: UpdateVehicleRequest) -> AppResult<()> {
        if let Some(customer_id) = request.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(brand) = request.brand {
            self.brand = brand;
        }
        if let Some(model) = request.model {
            self.model = model;
        }
        if let Some(plate) = request.license_plate {
            self.license_plate = plate.trim().to_uppercase();
        }
        self.year = request.year.or(self.year);
        self.fuel_type = request.fuel_type.or(self.fuel_type.take());
        self.chassis_number = request.chassis_number.or(self.chassis_number.take());
        Ok(())
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::new(EntityKind::Customer, self.customer_id)]
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.customer_id)
            .bind(self.brand.clone())
            .bind(self.model.clone())
            .bind(self.year)
            .bind(self.license_plate.clone())
            .bind(self.fuel_type.clone())
            .bind(self.chassis_number.clone())
    }
}

impl Vehicle {
    /// Etiqueta corta para listados: "Marca Modelo - PLACA"
    pub fn display_name(&self) -> String {
        format!("{} {} - {}", self.brand, self.model, self.license_plate)
    }
}
