use thiserror::Error;

#[derive(Error, Debug)]
pub enum NadriError {
    /// Any storage-layer failure. Callers with a network path treat this
    /// as "uncached" rather than fatal.
    #[error("Cache error: {0}")]
    Cache(#[from] tokio_rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level connectivity failure (timeout, DNS, refused).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Upstream answered with a non-success HTTP status.
    #[error("Upstream returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Upstream answered 200 but with an application-level result code.
    #[error("Tourism API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// True offline with nothing usable in the cache. Never answered
    /// with fallback data.
    #[error("Network connection required: {0}")]
    NetworkRequired(String),

    /// Local policy rejection while illustrative data is on screen.
    /// Surfaced to the caller verbatim, never retried.
    #[error("Write blocked: {0}")]
    WriteBlocked(String),
}
