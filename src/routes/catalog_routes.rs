use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::{CatalogEntity, Vehicle};
use crate::repositories::{CatalogRepository, CatalogStore};
use crate::routes::extractors::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router CRUD para un catálogo de referencia
pub fn create_catalog_router<T>() -> Router<AppState>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    Router::new()
        .route("/", get(list_records::<T>).post(create_record::<T>))
        .route(
            "/:id",
            get(get_record::<T>)
                .put(update_record::<T>)
                .delete(delete_record::<T>),
        )
}

/// Consulta de vehículos de un cliente
pub fn create_customer_vehicles_router() -> Router<AppState> {
    Router::new().route("/:id/vehicles", get(list_customer_vehicles))
}

async fn create_record<T>(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<T::Create>,
) -> Result<(StatusCode, Json<ApiResponse<T>>), AppError>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    let record = state.catalog.create::<T>(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            record,
            format!("{} creado exitosamente", T::KIND.label()),
        )),
    ))
}

async fn list_records<T>(State(state): State<AppState>) -> Result<Json<Vec<T>>, AppError>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    let records = state.catalog.list::<T>().await?;
    Ok(Json(records))
}

async fn get_record<T>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<T>, AppError>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    let record = state.catalog.get::<T>(id).await?;
    Ok(Json(record))
}

async fn update_record<T>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<T::Update>,
) -> Result<Json<ApiResponse<T>>, AppError>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    let record = state.catalog.update::<T>(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        record,
        format!("{} actualizado exitosamente", T::KIND.label()),
    )))
}

async fn delete_record<T>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError>
where
    T: CatalogEntity,
    dyn CatalogStore: CatalogRepository<T>,
{
    state.catalog.delete::<T>(id).await?;
    Ok(Json(ApiResponse::message(format!(
        "{} eliminado exitosamente",
        T::KIND.label()
    ))))
}

async fn list_customer_vehicles(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = state.catalog.vehicles_by_customer(id).await?;
    Ok(Json(vehicles))
}
