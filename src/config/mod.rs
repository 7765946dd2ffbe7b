//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y la tabla de descuentos por forma de pago.

pub mod database;
pub mod discount;
pub mod environment;

pub use discount::DiscountPolicy;
pub use environment::*;
