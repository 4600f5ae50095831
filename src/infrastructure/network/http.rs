// HTTP client utilities
use crate::domain::error::NadriError;
use reqwest::Client;

/// Create the shared HTTP client with appropriate pool settings.
pub fn create_client() -> Result<Client, NadriError> {
    Ok(Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .timeout(std::time::Duration::from_secs(15))
        .user_agent("nadri/0.1.0")
        .build()?)
}
