//! Aritmética monetaria
//!
//! Todos los valores de dinero viajan como `Decimal` con dos casas decimales.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::utils::errors::{AppError, AppResult};

/// Casas decimales usadas para moneda
pub const MONEY_SCALE: u32 = 2;

/// Redondear a centavos (mitad lejos de cero)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Mayor valor que cabe en una columna `NUMERIC(12,2)`
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Normalizar un valor de entrada: no negativo, acotado y con escala de centavos
pub fn normalize_money(value: Decimal, field: &str) -> AppResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{} must not be negative", field)));
    }
    let mut rounded = round_money(value);
    if rounded > max_money() {
        return Err(AppError::BadRequest(format!(
            "{} must not exceed {}",
            field,
            max_money()
        )));
    }
    rounded.rescale(MONEY_SCALE);
    Ok(rounded)
}

/// `quantity * unit_price` sin riesgo de overflow
pub fn line_total(quantity: i32, unit_price: Decimal) -> AppResult<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| overflow_error("line total"))
}

/// Suma de montos con aritmética verificada
pub fn checked_sum<I>(values: I) -> AppResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| overflow_error("sum"))
    })
}

/// Acumular un monto en un total existente
pub fn add_money(total: &mut Decimal, value: Decimal) -> AppResult<()> {
    *total = total.checked_add(value).ok_or_else(|| overflow_error("sum"))?;
    Ok(())
}

fn overflow_error(what: &str) -> AppError {
    AppError::BadRequest(format!("{} is outside the supported money range", what))
}

/// Aplicar un descuento porcentual (0-100) sobre un valor
///
/// El factor nunca supera 1, así que el resultado no crece respecto de `value`.
pub fn apply_discount(value: Decimal, percentage: Decimal) -> Decimal {
    let factor = (Decimal::ONE_HUNDRED - percentage) / Decimal::ONE_HUNDRED;
    let mut discounted = round_money(value * factor);
    discounted.rescale(MONEY_SCALE);
    discounted
}

/// Razón expresada en porcentaje con dos decimales; 0 cuando el denominador es 0
pub fn percentage(part: u64, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    round_money(Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
}
