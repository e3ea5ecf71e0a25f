use pollen_core::error::PollenError;
use reqwest::StatusCode;

/// High-level error type covering every failure mode the client can hit.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiCompatibleError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("host returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("response format error: {0}")]
    Format(String),

    #[error("host reported an error mid-stream: {0}")]
    Stream(String),

    #[error("stream frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl OpenAiCompatibleError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAiCompatibleError::Http(err) => err.is_connect() || err.is_timeout(),
            OpenAiCompatibleError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

impl From<OpenAiCompatibleError> for PollenError {
    fn from(value: OpenAiCompatibleError) -> Self {
        PollenError::Backend(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: StatusCode) -> OpenAiCompatibleError {
        OpenAiCompatibleError::Api {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn only_throttling_and_server_errors_retry() {
        assert!(api(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(api(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!api(StatusCode::UNAUTHORIZED).is_retryable());
        assert!(!api(StatusCode::BAD_REQUEST).is_retryable());
        assert!(!OpenAiCompatibleError::Format("x".into()).is_retryable());
    }

    #[test]
    fn converts_into_backend_error() {
        let err: PollenError = api(StatusCode::BAD_REQUEST).into();
        let inner = err
            .backend_error::<OpenAiCompatibleError>()
            .expect("backend error");
        assert!(matches!(inner, OpenAiCompatibleError::Api { status, .. } if *status == StatusCode::BAD_REQUEST));
    }
}
