//! Candidate generation gateway.
//!
//! Wraps the external generation engine behind the [`CandidateGenerator`]
//! seam: one call per batch, two alternative translations per source text,
//! usage metrics alongside. The HTTP client, the prompt the engine sees,
//! the response grammar, and the rate-limit retry policy each live in their
//! own submodule.

pub mod client;
pub mod decoder;
pub mod error;
pub mod prompt;
pub mod retry;
pub mod types;

pub use client::GenerationClient;
pub use error::GatewayError;
pub use retry::{GenerationOutcome, RetryPolicy, generate_with_retry};
pub use types::{CandidatePair, GenUsage};

use crate::config::TranslationStyle;
use crate::glossary::Glossary;

/// Batch generation of translation candidates.
///
/// Implementations must return exactly one [`CandidatePair`] per input text,
/// in input order, substituting the fallback marker for positions the
/// engine's response did not cover.
pub trait CandidateGenerator {
    async fn generate_batch(
        &self,
        texts: &[String],
        glossary: &Glossary,
        style: &TranslationStyle,
    ) -> Result<(Vec<CandidatePair>, GenUsage), GatewayError>;
}
