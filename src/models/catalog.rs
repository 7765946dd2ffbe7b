//! Contrato común de los catálogos de referencia
//!
//! Clientes, vehículos, funcionarios, piezas, servicios y formas de pago son
//! registros independientes sin ciclo de vida propio. Cada uno implementa
//! `CatalogEntity` y con eso obtiene CRUD completo en ambos stores y en HTTP.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::{PgArguments, PgRow}, query::QueryAs, FromRow, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppResult;

/// Query tipada de sqlx sobre Postgres
pub type PgQueryAs<'q, T> = QueryAs<'q, Postgres, T, PgArguments>;

/// Tipos de entidad que pueden ser referenciados por otras
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customer,
    Vehicle,
    Employee,
    Part,
    Service,
    PaymentMethod,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Vehicle => "Vehicle",
            EntityKind::Employee => "Employee",
            EntityKind::Part => "Part",
            EntityKind::Service => "Service",
            EntityKind::PaymentMethod => "PaymentMethod",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Vehicle => "vehicles",
            EntityKind::Employee => "employees",
            EntityKind::Part => "parts",
            EntityKind::Service => "services",
            EntityKind::PaymentMethod => "payment_methods",
        }
    }
}

/// Referencia a un registro de catálogo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Registro de catálogo persistible
///
/// `COLUMNS` lista las columnas en el mismo orden en que `bind_columns`
/// agrega los valores; la columna `id` siempre va primero y no se incluye.
pub trait CatalogEntity:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn id(&self) -> Uuid;

    fn from_create(id: Uuid, request: Self::Create) -> AppResult<Self>;

    fn apply_update(&mut self, request: Self::Update) -> AppResult<()>;

    /// Referencias a otros catálogos que deben existir antes de escribir
    fn references(&self) -> Vec<EntityRef> {
        Vec::new()
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}
