//! Shared application state.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use pawmart_db::Database;

/// State handed to every handler. Cloned per request; all fields are
/// shared handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Builds the state from a loaded configuration, including the token
    /// manager for the configured secret.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}
