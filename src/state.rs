use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state: the record store and the resolved configuration
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
