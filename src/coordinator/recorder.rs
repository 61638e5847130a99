//! Applying an operator's decision to the current batch item.
//!
//! Skip releases the item's lock and moves on without touching the store.
//! The three accepting decisions write through the sink first and only then
//! release the lock and advance; a failed write-back keeps the lock and the
//! cursor position so the same operator can retry without losing the item.

use tracing::info;

use super::cursor::SessionCursor;
use super::locks::LockTable;
use crate::error::TandemError;
use crate::store::{ItemSink, StoreError};

/// What the operator chose for the current item.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Accept the first candidate.
    First,
    /// Accept the second candidate.
    Second,
    /// Accept operator-edited text.
    Edited(String),
    /// Leave the item for someone else.
    Skip,
}

/// What happened to the current item.
#[derive(Debug)]
pub enum DecideOutcome {
    /// Written back, lock released, cursor advanced.
    Saved,
    /// Lock released, cursor advanced, nothing written.
    Skipped,
    /// Write-back failed; the lock and cursor position are unchanged so the
    /// decision can be resubmitted.
    SaveFailed { error: StoreError },
}

/// Apply `decision` to the session's current batch item.
pub async fn decide<K: ItemSink>(
    sink: &K,
    locks: &LockTable,
    cursor: &mut SessionCursor,
    session: &str,
    decision: Decision,
    as_review: bool,
) -> Result<DecideOutcome, TandemError> {
    let (item_id, first, second) = match cursor.current() {
        Some(current) => (
            current.item.id,
            current.candidates.first.clone(),
            current.candidates.second.clone(),
        ),
        None => return Err(TandemError::NoActiveItem),
    };

    let text = match decision {
        Decision::Skip => {
            locks.release(item_id, session);
            cursor.advance();
            info!(item_id, session, "item skipped");
            return Ok(DecideOutcome::Skipped);
        }
        Decision::First => first,
        Decision::Second => second,
        Decision::Edited(text) => text,
    };

    match sink.write_back(item_id, &text, as_review).await {
        Ok(()) => {
            locks.release(item_id, session);
            cursor.stats.completed += 1;
            cursor.advance();
            info!(item_id, session, as_review, "translation saved");
            Ok(DecideOutcome::Saved)
        }
        Err(error) => {
            info!(item_id, session, %error, "write-back failed, item retained");
            Ok(DecideOutcome::SaveFailed { error })
        }
    }
}
