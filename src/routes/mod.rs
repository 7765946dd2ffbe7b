//! Rutas HTTP del API
//!
//! `create_router` arma el router completo con CORS y trazas.

pub mod catalog_routes;
pub mod execution_routes;
pub mod extractors;
pub mod part_usage_routes;
pub mod report_routes;
pub mod service_order_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::StorageBackend;
use crate::middleware::cors::cors_layer;
use crate::models::{Customer, Employee, Part, PaymentMethod, Service, Vehicle};
use crate::state::AppState;

use catalog_routes::{create_catalog_router, create_customer_vehicles_router};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/customers",
            create_catalog_router::<Customer>().merge(create_customer_vehicles_router()),
        )
        .nest("/api/vehicles", create_catalog_router::<Vehicle>())
        .nest("/api/employees", create_catalog_router::<Employee>())
        .nest("/api/parts", create_catalog_router::<Part>())
        .nest("/api/services", create_catalog_router::<Service>())
        .nest("/api/payment-methods", create_catalog_router::<PaymentMethod>())
        .nest(
            "/api/service-orders",
            service_order_routes::create_service_order_router(),
        )
        .nest(
            "/api/part-usages",
            part_usage_routes::create_part_usage_router(),
        )
        .nest("/api/executions", execution_routes::create_execution_router())
        .nest("/api/reports", report_routes::create_report_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Endpoint de salud
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let storage = match state.config.storage {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Memory => "memory",
    };
    Json(json!({
        "status": "ok",
        "storage": storage,
        "environment": state.config.environment,
        "today": state.today(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
