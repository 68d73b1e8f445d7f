use crate::config::Config;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared, read-only state handed to the request pipeline.
///
/// Built once in `main` and registered as `web::Data<AppContext>`; handlers and
/// middleware read the configuration and the database pool from it.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db: PgPool,
}

impl AppContext {
    pub fn new(config: Config, db: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}
