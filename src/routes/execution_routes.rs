use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::{ApiResponse, ExecutionView};
use crate::models::execution::{FinalizeOrderRequest, UpdateExecutionRequest};
use crate::routes::extractors::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_execution_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_executions).post(finalize_order))
        .route(
            "/:id",
            get(get_execution)
                .put(update_execution)
                .delete(remove_execution),
        )
}

async fn finalize_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FinalizeOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExecutionView>>), AppError> {
    let execution = state.executions.finalize(request, state.today()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            execution,
            "Orden finalizada exitosamente",
        )),
    ))
}

async fn list_executions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExecutionView>>, AppError> {
    let executions = state.executions.list(state.today()).await?;
    Ok(Json(executions))
}

async fn get_execution(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ExecutionView>, AppError> {
    let execution = state.executions.get(id, state.today()).await?;
    Ok(Json(execution))
}

async fn update_execution(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateExecutionRequest>,
) -> Result<Json<ApiResponse<ExecutionView>>, AppError> {
    let execution = state
        .executions
        .update(id, request, state.today())
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        execution,
        "Ejecución actualizada exitosamente",
    )))
}

async fn remove_execution(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.executions.remove(id).await?;
    Ok(Json(ApiResponse::message(
        "Ejecución eliminada, la orden vuelve a estar abierta",
    )))
}
