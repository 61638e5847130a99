//! Error type for the generation gateway.

use thiserror::Error;

/// Failures surfaced by the generation engine or the retry policy around it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The engine reported quota exhaustion (HTTP 429). The hint, when
    /// present, is how long the engine asked us to wait.
    #[error("rate limited by the generation engine")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Any other error answer from the engine (4xx/5xx).
    #[error("generation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Underlying network failure (DNS, refused connection, timeout).
    #[error("generation network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The retry wait was cancelled by the operator.
    #[error("generation cancelled while waiting to retry")]
    Cancelled,

    /// Rate-limit retries were exhausted without a successful call.
    #[error("generation still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = GatewayError::Api {
            status: 401,
            message: "invalid key".into(),
        };
        assert_eq!(
            err.to_string(),
            "generation API error (status 401): invalid key"
        );
    }

    #[test]
    fn retries_exhausted_display() {
        let err = GatewayError::RetriesExhausted { attempts: 4 };
        assert_eq!(
            err.to_string(),
            "generation still rate limited after 4 attempts"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GatewayError>();
    }
}
