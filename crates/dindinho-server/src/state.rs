use std::sync::Arc;

use dindinho_config::DindinhoConfig;
use dindinho_db::service::DindinhoService;

/// Shared handler state. Cloned per request; both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DindinhoService>,
    pub config: Arc<DindinhoConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(service: DindinhoService, config: DindinhoConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
