//! Configuración de conexión a PostgreSQL
//!
//! Este módulo abre el pool y aplica las migraciones de `migrations/`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Conexión ya migrada a la base de datos
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Crear el pool y dejar el schema al día
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🗄️ Conectando a PostgreSQL en {}", config.masked_url());

        let pool = config
            .create_pool()
            .await
            .context("could not connect to PostgreSQL")?;

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("database migrations failed")?;
    info!("✅ Migraciones aplicadas");
    Ok(())
}
