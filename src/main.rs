use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use repair_shop::config::{EnvironmentConfig, StorageBackend};
use repair_shop::database::DatabaseConnection;
use repair_shop::repositories::{InMemoryStore, PgStore};
use repair_shop::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,repair_shop=debug")),
        )
        .init();

    info!("🔧 Repair Shop - API de órdenes de servicio");
    info!("============================================");

    let config = EnvironmentConfig::from_env().context("invalid configuration")?;
    info!(
        "⚙️ Entorno: {} | {} descuentos por forma de pago configurados",
        config.environment,
        config.discounts.len()
    );

    let state = match config.storage {
        StorageBackend::Postgres => {
            let database = config
                .database
                .clone()
                .context("DATABASE_URL must be set when STORAGE_BACKEND=postgres")?;
            let db_connection = match DatabaseConnection::connect(&database).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            info!("✅ PostgreSQL listo");
            AppState::new(Arc::new(PgStore::new(db_connection.pool().clone())), config.clone())
        }
        StorageBackend::Memory => {
            info!("🧠 Usando store en memoria (los datos no persisten)");
            AppState::new(Arc::new(InMemoryStore::new()), config.clone())
        }
    };

    let app = create_router(state);

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}", config.server_url()))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("📚 Catálogos (GET, POST, GET/PUT/DELETE /:id):");
    info!("   /api/customers, /api/vehicles, /api/employees");
    info!("   /api/parts, /api/services, /api/payment-methods");
    info!("   GET  /api/customers/:id/vehicles - Vehículos del cliente");
    info!("📋 Órdenes de servicio:");
    info!("   POST /api/service-orders - Abrir orden");
    info!("   GET  /api/service-orders - Listar órdenes");
    info!("   GET  /api/service-orders/open - Órdenes sin ejecución");
    info!("   GET/PUT/DELETE /api/service-orders/:id");
    info!("   GET/POST /api/service-orders/:id/parts - Piezas de la orden");
    info!("   GET/DELETE /api/part-usages/:id");
    info!("💰 Ejecuciones:");
    info!("   POST /api/executions - Finalizar orden");
    info!("   GET  /api/executions - Listar ejecuciones");
    info!("   GET/PUT/DELETE /api/executions/:id");
    info!("📊 Reportes (?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD):");
    info!("   /api/reports/orders-by-employee, /api/reports/services");
    info!("   /api/reports/parts/total, /api/reports/parts/usage");
    info!("   /api/reports/executions, /api/reports/employee-performance");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
