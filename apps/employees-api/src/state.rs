//! Shared application state.

use mongodb::{Client, Database};

/// Cloned into each router; the MongoDB handles share one connection pool
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
