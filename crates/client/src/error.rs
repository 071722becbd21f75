use api_types::DecodeError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    ///
    /// `kind` is the `type` member of the error body (`not_found_error`,
    /// `invalid_parameters_error`, ...) when the server sent one.
    #[error("{status}: {message}")]
    Server {
        status: StatusCode,
        kind: Option<String>,
        message: String,
    },
    #[error("invalid response: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid api key: {0}")]
    InvalidApiKey(String),
}

impl ApiError {
    /// HTTP status of a server error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Network(err) => err.status(),
            Self::Server { status, .. } => Some(*status),
            Self::Decode(_) | Self::InvalidBaseUrl(_) | Self::InvalidApiKey(_) => None,
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// The client never retries on its own; callers own the retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_timeout() || err.is_connect(),
            Self::Server { status, .. } => {
                matches!(
                    *status,
                    StatusCode::REQUEST_TIMEOUT
                        | StatusCode::CONFLICT
                        | StatusCode::TOO_MANY_REQUESTS
                ) || status.is_server_error()
            }
            Self::Decode(_) | Self::InvalidBaseUrl(_) | Self::InvalidApiKey(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: StatusCode) -> ApiError {
        ApiError::Server {
            status,
            kind: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(server(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(server(StatusCode::CONFLICT).is_retryable());
        assert!(server(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!server(StatusCode::NOT_FOUND).is_retryable());
        assert!(!server(StatusCode::UNAUTHORIZED).is_retryable());
    }

    #[test]
    fn decode_errors_are_final() {
        let err = ApiError::from(DecodeError::MalformedJson("eof".to_string()));
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "invalid response: malformed JSON: eof");
    }

    #[test]
    fn server_error_display() {
        assert_eq!(
            server(StatusCode::NOT_FOUND).to_string(),
            "404 Not Found: boom"
        );
        assert_eq!(
            server(StatusCode::NOT_FOUND).status(),
            Some(StatusCode::NOT_FOUND)
        );
    }
}
