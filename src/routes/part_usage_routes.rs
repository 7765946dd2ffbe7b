use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::{ApiResponse, PartUsageView};
use crate::routes::extractors::ApiPath;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_part_usage_router() -> Router<AppState> {
    Router::new().route("/:id", get(get_part_usage).delete(detach_part))
}

async fn get_part_usage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PartUsageView>, AppError> {
    let usage = state.part_usages.get(id).await?;
    Ok(Json(usage))
}

async fn detach_part(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.part_usages.detach(id).await?;
    Ok(Json(ApiResponse::message("Pieza eliminada de la orden")))
}
