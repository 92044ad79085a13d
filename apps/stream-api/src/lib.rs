pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod payments;
pub mod routes;
pub mod tips;

use std::sync::Arc;

use auth::identity::IdentityProvider;
use config::Config;
use db::store::TipStore;
use gateway::fanout::RoomHub;
use payments::PaymentExecutor;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub tips: Arc<dyn TipStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub payments: Arc<dyn PaymentExecutor>,
    pub rooms: Arc<RoomHub>,
    pub config: Arc<Config>,
}
