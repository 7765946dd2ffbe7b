//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos usadas
//! desde los `#[validate(custom = ...)]` de los requests y desde los servicios.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::utils::errors::{AppError, AppResult};

/// Validar que un valor monetario no sea negativo
pub fn validate_non_negative_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar CPF/documento: 11 dígitos, se aceptan puntos y guiones
pub fn validate_tax_id(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let only_allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '/');
    if digits != 11 || !only_allowed {
        let mut error = ValidationError::new("tax_id");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"11 digits".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 8 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de placa de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let clean_plate = value.replace([' ', '-', '_'], "");
    if clean_plate.len() < 5
        || clean_plate.len() > 10
        || !clean_plate.chars().all(|c| c.is_ascii_alphanumeric())
    {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que la ventana de fechas de un reporte esté bien formada
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::BadRequest(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }
    Ok(())
}
