//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Date ordering violation: {0}")]
    DateOrderingViolation(String),

    #[error("Already finalized: {0}")]
    AlreadyFinalized(String),

    #[error("Order has execution: {0}")]
    OrderHasExecution(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: &'static str,
}

impl AppError {
    /// Código estable que los clientes pueden comparar
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidQuantity(_) => "INVALID_QUANTITY",
            AppError::DateOrderingViolation(_) => "DATE_ORDERING_VIOLATION",
            AppError::AlreadyFinalized(_) => "ALREADY_FINALIZED",
            AppError::OrderHasExecution(_) => "ORDER_HAS_EXECUTION",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyFinalized(_)
            | AppError::OrderHasExecution(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::ReferenceNotFound(_)
            | AppError::InvalidQuantity(_)
            | AppError::DateOrderingViolation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let error_response = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code,
                }
            }

            other => {
                let title = match &other {
                    AppError::ReferenceNotFound(_) => "Reference Not Found",
                    AppError::NotFound(_) => "Not Found",
                    AppError::InvalidQuantity(_) => "Invalid Quantity",
                    AppError::DateOrderingViolation(_) => "Date Ordering Violation",
                    AppError::AlreadyFinalized(_) => "Already Finalized",
                    AppError::OrderHasExecution(_) => "Order Has Execution",
                    AppError::Conflict(_) => "Conflict",
                    _ => "Bad Request",
                };
                let message = match other {
                    AppError::ReferenceNotFound(msg)
                    | AppError::NotFound(msg)
                    | AppError::InvalidQuantity(msg)
                    | AppError::DateOrderingViolation(msg)
                    | AppError::AlreadyFinalized(msg)
                    | AppError::OrderHasExecution(msg)
                    | AppError::Conflict(msg)
                    | AppError::BadRequest(msg)
                    | AppError::Internal(msg) => msg,
                    AppError::Database(e) => e.to_string(),
                    AppError::Validation(e) => e.to_string(),
                };
                warn!("⚠️ {} ({}): {}", title, code, message);
                ErrorResponse {
                    error: title.to_string(),
                    message,
                    details: None,
                    code,
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para referencias que no resuelven
pub fn reference_not_found_error(resource: &str, id: &str) -> AppError {
    AppError::ReferenceNotFound(format!("{} with id '{}' does not exist", resource, id))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Traducir errores de Postgres con código SQLSTATE conocido
///
/// 23505 (unique_violation) sobre la restricción de ejecución única pasa a
/// `AlreadyFinalized`; 23503 (foreign_key_violation) pasa a `Conflict`.
pub fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("executions_service_order_id_key") => {
                return AppError::AlreadyFinalized(
                    "service order already has an execution".to_string(),
                );
            }
            Some("23503") => {
                return AppError::Conflict(format!(
                    "record is still referenced ({})",
                    db_err.constraint().unwrap_or("foreign key")
                ));
            }
            _ => {}
        }
    }
    AppError::Database(e)
}
