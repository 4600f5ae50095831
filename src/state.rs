use crate::domain::error::NadriError;
use crate::domain::mode::ModeState;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::http::create_client;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_rusqlite::Connection;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Connection>,
    pub config: Arc<RwLock<Config>>,
    pub http_client: Client,
    pub mode: ModeState,
}

impl AppState {
    pub fn new(db: Connection, config: Config) -> Result<Self, NadriError> {
        Ok(Self {
            db: Arc::new(db),
            config: Arc::new(RwLock::new(config)),
            http_client: create_client()?,
            mode: ModeState::new(),
        })
    }
}
