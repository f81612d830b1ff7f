use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Errors that can occur while talking to an external collaborator.
/// `Display` is the bare message so it can be surfaced to the user as is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    /// Non-success status with the collaborator's own message
    #[error("{message}")]
    HttpError { status: u16, message: String },
    #[error("{0}")]
    NotFound(String),
    /// Unreachable, refused or timed out
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Body does not match the expected contract
    #[error("{0}")]
    InvalidResponse(String),
    /// Missing or rejected credentials (401/403)
    #[error("{0}")]
    Unauthorized(String),
    /// Quota exceeded (429)
    #[error("{0}")]
    RateLimited(String),
    /// Misconfiguration on our side
    #[error("{0}")]
    Internal(String),
}

impl ConnectorError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::HttpError { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for ConnectorError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(json!({
            "error": self.to_string(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        self.status()
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::HttpError {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

/// Pull a human message out of an error body: `{error: "..."}`,
/// `{error: {message: "..."}}`, `{message: "..."}`, or the raw text.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            let trimmed = body.trim();
            return (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
    };

    value["error"]
        .as_str()
        .or_else(|| value["error"]["message"].as_str())
        .or_else(|| value["message"].as_str())
        .map(|s| s.to_string())
}
