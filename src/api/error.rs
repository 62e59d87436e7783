use thiserror::Error;

/// Remote-call failure taxonomy. Status codes stay structured so the
/// pipeline monitor can retry a 404 without string-matching errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend could not be reached at all (connect/DNS level).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            return ApiError::Unavailable(err.to_string());
        }
        if let Some(status) = err.status() {
            return ApiError::Status {
                code: status.as_u16(),
                message: err.to_string(),
            };
        }
        ApiError::Transport(err)
    }
}

impl ApiError {
    /// The monitor treats 404 as "session not indexed yet", not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { code: 404, .. })
    }
}

/// Swallow-and-log for operations that are best-effort by contract
/// (monitoring restart, segmentation trigger). The primary flow must
/// never observe their failure.
pub fn best_effort<T>(result: Result<T, ApiError>, what: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{} failed (best-effort, ignored): {}", what, e);
            None
        }
    }
}
