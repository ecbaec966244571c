use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::Config, db::Cache};

/// Shared application state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cache: Cache,
    pub config: Arc<Config>,
}
