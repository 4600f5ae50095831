use crate::domain::error::NadriError;

/// Upstream application-level result codes that matter to classification.
/// The service reports them in the response header even on HTTP 200.
pub const RESULT_NO_DATA: &str = "03";
pub const RESULT_QUOTA_EXCEEDED: &str = "22";
pub const RESULT_SERVICE_KEY_INVALID: &str = "30";
pub const RESULT_SERVICE_KEY_EXPIRED: &str = "31";

/// Fixed set of failure categories a remote call can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkOffline,
    AuthExpired,
    QuotaExceeded,
    ServerError,
    NoData,
    Unknown,
}

/// What the repository does about a classified failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Serve bundled sample data and flip the mode to `MockFallback`
    /// with the given user-facing reason.
    Degrade { reason: String },
    /// Flip to `Offline`. Never substitutes sample data: a user with no
    /// connectivity must not be shown fabricated content as if it were
    /// live.
    GoOffline,
    /// Resolve to an empty result, no mode change.
    Empty,
}

/// Maps a raw transport/response failure to a category.
///
/// Precedence: transport-layer connectivity first, then HTTP 401/403,
/// then 5xx, then upstream result codes (which is where the daily-quota
/// signal arrives), then everything else as `Unknown`.
pub fn classify(err: &NadriError) -> FailureKind {
    match err {
        NadriError::Connection(_) => FailureKind::NetworkOffline,
        NadriError::Http(e) => {
            if e.is_timeout() || e.is_connect() {
                FailureKind::NetworkOffline
            } else if let Some(status) = e.status() {
                classify_status(status.as_u16())
            } else {
                FailureKind::Unknown
            }
        }
        NadriError::HttpStatus { status } => classify_status(*status),
        NadriError::Api { code, .. } => match code.as_str() {
            RESULT_QUOTA_EXCEEDED => FailureKind::QuotaExceeded,
            RESULT_SERVICE_KEY_INVALID | RESULT_SERVICE_KEY_EXPIRED => FailureKind::AuthExpired,
            RESULT_NO_DATA => FailureKind::NoData,
            _ => FailureKind::Unknown,
        },
        _ => FailureKind::Unknown,
    }
}

impl FailureKind {
    /// The upstream does not reliably distinguish bad credentials from
    /// an exhausted daily quota, so both land in the same degrade
    /// policy with different wording.
    pub fn policy(&self) -> FailurePolicy {
        match self {
            FailureKind::NetworkOffline => FailurePolicy::GoOffline,
            FailureKind::AuthExpired => FailurePolicy::Degrade {
                reason: "tourism service rejected the credentials; showing sample data"
                    .to_string(),
            },
            FailureKind::QuotaExceeded => FailurePolicy::Degrade {
                reason: "daily tourism API quota exhausted; showing sample data".to_string(),
            },
            FailureKind::ServerError => FailurePolicy::Degrade {
                reason: "tourism service is unavailable; showing sample data".to_string(),
            },
            FailureKind::NoData | FailureKind::Unknown => FailurePolicy::Empty,
        }
    }
}

fn classify_status(status: u16) -> FailureKind {
    match status {
        401 | 403 => FailureKind::AuthExpired,
        500..=599 => FailureKind::ServerError,
        _ => FailureKind::Unknown,
    }
}
