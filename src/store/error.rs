//! Error type for the remote item store.

use thiserror::Error;

/// Failures surfaced by [`ItemSource`](super::ItemSource) and
/// [`ItemSink`](super::ItemSink) implementations.
///
/// The coordinator never retries these on its own; the raw status is kept so
/// the caller can decide between retry and abort.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a non-2xx status.
    #[error("store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Underlying network failure (DNS, refused connection, timeout).
    #[error("store network error: {0}")]
    Network(#[from] reqwest::Error),
}
