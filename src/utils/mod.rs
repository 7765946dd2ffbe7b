//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y aritmética monetaria.

pub mod errors;
pub mod money;
pub mod validation;
