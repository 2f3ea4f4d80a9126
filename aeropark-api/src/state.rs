use std::sync::Arc;

use aeropark_store::app_config::BusinessRules;
use aeropark_store::DbClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub business_rules: BusinessRules,
    pub auth: AuthConfig,
}
