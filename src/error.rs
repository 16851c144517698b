use reqwest::StatusCode;
use thiserror::Error;

/// Why a request to the task backend did not succeed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, DNS, timeout...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server replied {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
