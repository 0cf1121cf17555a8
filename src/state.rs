use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, notify::Notifier, uploads::ProofStore};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub notifier: Notifier,
    pub proofs: Arc<dyn ProofStore>,
}
