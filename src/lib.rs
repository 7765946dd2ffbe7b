//! Backend del taller mecánico
//!
//! Catálogos de referencia, ciclo de vida de la orden de servicio
//! (apertura, piezas, finalización) y reportes por período.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
