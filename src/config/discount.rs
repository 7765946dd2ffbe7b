//! Política de descuentos por forma de pago
//!
//! Tabla `forma de pago -> porcentaje` cargada desde `PAYMENT_DISCOUNTS`.
//! Las claves pueden ser el UUID de la forma de pago o su descripción
//! (sin distinguir mayúsculas). Ejemplo: `Dinheiro=10,Pix=5`.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PaymentMethod;
use crate::utils::money::apply_discount;

#[derive(Debug, Error, PartialEq)]
pub enum DiscountConfigError {
    #[error("discount entry '{0}' must look like KEY=PERCENT")]
    MalformedEntry(String),

    #[error("discount percentage '{0}' is not a decimal number")]
    InvalidPercentage(String),

    #[error("discount percentage {0} is outside 0..=100")]
    OutOfRange(Decimal),
}

#[derive(Debug, Clone, Default)]
pub struct DiscountPolicy {
    by_id: HashMap<Uuid, Decimal>,
    by_description: HashMap<String, Decimal>,
}

impl DiscountPolicy {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parsear la tabla desde su forma textual
    pub fn parse(raw: &str) -> Result<Self, DiscountConfigError> {
        let mut policy = Self::default();

        for entry in raw.split([',', ';']).map(str::trim).filter(|e| !e.is_empty()) {
            let (key, raw_percentage) = entry
                .split_once('=')
                .ok_or_else(|| DiscountConfigError::MalformedEntry(entry.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(DiscountConfigError::MalformedEntry(entry.to_string()));
            }

            let percentage = Decimal::from_str(raw_percentage.trim())
                .map_err(|_| DiscountConfigError::InvalidPercentage(raw_percentage.trim().to_string()))?;
            policy = policy.with_rule(key, percentage)?;
        }

        Ok(policy)
    }

    /// Agregar una regla; la clave es un UUID o una descripción
    pub fn with_rule(mut self, key: &str, percentage: Decimal) -> Result<Self, DiscountConfigError> {
        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(DiscountConfigError::OutOfRange(percentage));
        }
        match Uuid::parse_str(key) {
            Ok(id) => {
                self.by_id.insert(id, percentage);
            }
            Err(_) => {
                self.by_description.insert(normalize_key(key), percentage);
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_description.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Porcentaje configurado para la forma de pago, si existe
    pub fn percentage_for(&self, method: &PaymentMethod) -> Option<Decimal> {
        self.by_id
            .get(&method.id)
            .or_else(|| self.by_description.get(&normalize_key(&method.description)))
            .copied()
    }

    /// `(valor, forma de pago) -> valor con descuento | None`
    pub fn discounted_value(&self, value: Decimal, method: &PaymentMethod) -> Option<Decimal> {
        self.percentage_for(method)
            .map(|percentage| apply_discount(value, percentage))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
