use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use crate::models::report::{
    DateRange, EmployeeOrderCount, EmployeePerformance, ExecutionReportRow, PartUsageSummary,
    PartsTotal, ServiceSummary,
};
use crate::routes::extractors::ApiQuery;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/orders-by-employee", get(orders_by_employee))
        .route("/services", get(services))
        .route("/parts/total", get(parts_total))
        .route("/parts/usage", get(parts_usage))
        .route("/executions", get(executions))
        .route("/employee-performance", get(employee_performance))
}

async fn orders_by_employee(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<Vec<EmployeeOrderCount>>, AppError> {
    Ok(Json(state.reports.orders_by_employee(range).await?))
}

async fn services(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<Vec<ServiceSummary>>, AppError> {
    Ok(Json(state.reports.services(range).await?))
}

async fn parts_total(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<PartsTotal>, AppError> {
    Ok(Json(state.reports.parts_total(range).await?))
}

async fn parts_usage(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<Vec<PartUsageSummary>>, AppError> {
    Ok(Json(state.reports.parts_usage(range).await?))
}

async fn executions(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<Vec<ExecutionReportRow>>, AppError> {
    Ok(Json(state.reports.executions(range, state.today()).await?))
}

async fn employee_performance(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<Vec<EmployeePerformance>>, AppError> {
    Ok(Json(
        state
            .reports
            .employee_performance(range, state.today())
            .await?,
    ))
}
