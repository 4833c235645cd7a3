use std::sync::Arc;

use actix_web::web::Data;
use log::info;

use config::app_config::AppConfig;
use db::{memory_store::MemoryStore, PollStore, DB};

pub mod config;
pub mod db;
pub mod error;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

/// Opens the store named by the configured database URL and seeds the
/// configured staff account.
pub async fn init_store(app_config: &AppConfig) -> anyhow::Result<Data<dyn PollStore>> {
    let store: Arc<dyn PollStore> = if app_config.uses_memory_store() {
        info!("Using the in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(DB::init(app_config).await?)
    };

    if let (Some(username), Some(password)) = (&app_config.admin_username, &app_config.admin_password) {
        services::accounts::ensure_admin(store.as_ref(), username, password, app_config.bcrypt_cost)
            .await
            .map_err(|e| anyhow::anyhow!("Failed creating the staff account: {}", e))?;
    }
    Ok(Data::from(store))
}
