//! Rate-limit retry policy around batch generation.
//!
//! A rate-limited call is retried with the full batch after waiting the
//! engine's hint (or a configured default when the engine gives none). The
//! wait is an async delay raced against a cancellation token, so an
//! operator can abandon it without blocking anything else. Any failure
//! other than rate limiting aborts the batch immediately.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::CandidateGenerator;
use super::error::GatewayError;
use super::types::{CandidatePair, GenUsage};
use crate::config::TranslationStyle;
use crate::glossary::Glossary;

/// How often and how long to wait when the engine is rate limited.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Wait used when the engine's answer carries no hint.
    pub default_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            default_wait: Duration::from_secs(60),
        }
    }
}

/// A successful generation, with the number of attempts it took.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub pairs: Vec<CandidatePair>,
    pub usage: GenUsage,
    pub attempts: u32,
}

/// Run `generate_batch` with rate-limit retries.
///
/// Returns [`GatewayError::RetriesExhausted`] once the retry budget is
/// spent, and [`GatewayError::Cancelled`] if `cancel` fires during a wait.
pub async fn generate_with_retry<G: CandidateGenerator>(
    generator: &G,
    texts: &[String],
    glossary: &Glossary,
    style: &TranslationStyle,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<GenerationOutcome, GatewayError> {
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match generator.generate_batch(texts, glossary, style).await {
            Ok((pairs, usage)) => {
                return Ok(GenerationOutcome {
                    pairs,
                    usage,
                    attempts,
                });
            }
            Err(GatewayError::RateLimited { retry_after_ms }) => {
                if attempts > policy.max_retries {
                    return Err(GatewayError::RetriesExhausted { attempts });
                }
                let wait = retry_after_ms
                    .map(Duration::from_millis)
                    .unwrap_or(policy.default_wait);
                warn!(
                    attempt = attempts,
                    max_retries = policy.max_retries,
                    wait_secs = wait.as_secs(),
                    "rate limited, waiting before retry"
                );
                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                }
            }
            Err(other) => return Err(other),
        }
    }
}
