use sqlx::PgPool;

/// Store respaldado por PostgreSQL
///
/// Implementa los repositorios de catálogo y de órdenes sobre el mismo pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
