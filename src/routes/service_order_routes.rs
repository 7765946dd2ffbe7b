use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::{ApiResponse, PartUsageView, ServiceOrderDetail, ServiceOrderView};
use crate::models::part_usage::AttachPartRequest;
use crate::models::service_order::{CreateServiceOrderRequest, UpdateServiceOrderRequest};
use crate::routes::extractors::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_service_order_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/open", get(list_open_orders))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/:id/parts", get(list_order_parts).post(attach_part))
}

async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateServiceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceOrderView>>), AppError> {
    let order = state
        .service_orders
        .create(request, state.today())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            order,
            "Orden de servicio abierta exitosamente",
        )),
    ))
}

async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceOrderView>>, AppError> {
    let orders = state.service_orders.list().await?;
    Ok(Json(orders))
}

async fn list_open_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceOrderView>>, AppError> {
    let orders = state.service_orders.list_open().await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ServiceOrderDetail>, AppError> {
    let order = state.service_orders.get(id, state.today()).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateServiceOrderRequest>,
) -> Result<Json<ApiResponse<ServiceOrderView>>, AppError> {
    let order = state.service_orders.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Orden de servicio actualizada exitosamente",
    )))
}

async fn delete_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.service_orders.delete(id).await?;
    Ok(Json(ApiResponse::message(
        "Orden de servicio eliminada exitosamente",
    )))
}

async fn list_order_parts(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<PartUsageView>>, AppError> {
    let parts = state.part_usages.list_for_order(id).await?;
    Ok(Json(parts))
}

async fn attach_part(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AttachPartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PartUsageView>>), AppError> {
    let usage = state.part_usages.attach(id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            usage,
            "Pieza agregada exitosamente",
        )),
    ))
}
