//! In-memory item locks with timeout-based recovery.
//!
//! Every work item handed to an operator holds exactly one lock keyed by
//! item id. Locks expire lazily: an entry older than the timeout is treated
//! as absent at the next lookup, so a disconnected operator's items become
//! claimable again without any background sweep. All operations take the
//! table mutex once and never hold it across awaits.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// An exclusive, time-bounded claim by a session on one item.
#[derive(Debug, Clone)]
struct Lock {
    session: String,
    acquired_at: Instant,
}

/// Registry of item locks, shared by all sessions.
pub struct LockTable {
    timeout: Duration,
    inner: Mutex<HashMap<i64, Lock>>,
}

impl LockTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn expired(&self, lock: &Lock, now: Instant) -> bool {
        now.saturating_duration_since(lock.acquired_at) > self.timeout
    }

    /// Try to claim `item_id` for `session` at time `now`.
    ///
    /// Succeeds when the item is unlocked, when the existing lock has
    /// expired, or when `session` already holds it (re-acquire keeps the
    /// original acquisition time). Fails without mutating state when
    /// another live session holds the item.
    pub fn acquire(&self, item_id: i64, session: &str, now: Instant) -> bool {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = table.get(&item_id) {
            if existing.session == session {
                return true;
            }
            if !self.expired(existing, now) {
                return false;
            }
            debug!(item_id, evicted = %existing.session, "expired lock evicted");
        }

        table.insert(
            item_id,
            Lock {
                session: session.to_string(),
                acquired_at: now,
            },
        );
        true
    }

    /// Release `item_id` iff `session` holds it; otherwise a no-op.
    pub fn release(&self, item_id: i64, session: &str) {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if table
            .get(&item_id)
            .is_some_and(|lock| lock.session == session)
        {
            table.remove(&item_id);
            debug!(item_id, session, "lock released");
        }
    }

    /// The session currently holding `item_id`, if any.
    ///
    /// Applies the same lazy expiry as [`acquire`](Self::acquire): an
    /// expired entry is removed and reported as absent.
    #[allow(dead_code)]
    pub fn holder_of(&self, item_id: i64, now: Instant) -> Option<String> {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match table.get(&item_id) {
            Some(lock) if !self.expired(lock, now) => return Some(lock.session.clone()),
            Some(_) => {}
            None => return None,
        }
        table.remove(&item_id);
        None
    }
}
