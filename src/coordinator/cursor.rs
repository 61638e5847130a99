//! Per-session progress state.
//!
//! A [`SessionCursor`] tracks where one operator session stands in the item
//! stream: the page window it is scanning, the batch currently in flight,
//! and its aggregate counters. Cursors are owned by the service, one per
//! session, and mutated only while that session's own request holds them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gateway::CandidatePair;
use crate::store::{Stage, WorkItem};

/// One locked item of a batch together with its generated candidates.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub item: WorkItem,
    pub candidates: CandidatePair,
}

/// A bounded, ordered group of items locked together and generated together.
#[derive(Debug, Clone)]
pub struct Batch {
    pub items: Vec<BatchItem>,
}

impl Batch {
    /// Pair up the assembled items with their candidates, positionally.
    pub fn from_parts(items: Vec<WorkItem>, candidates: Vec<CandidatePair>) -> Self {
        debug_assert_eq!(items.len(), candidates.len());
        Self {
            items: items
                .into_iter()
                .zip(candidates)
                .map(|(item, candidates)| BatchItem { item, candidates })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Aggregate counters for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Items saved through the sink.
    pub completed: u64,
    /// Generation calls issued, retries included.
    pub generation_calls: u64,
    /// Cumulative input+output tokens across those calls.
    pub tokens_used: u64,
    pub started_at: DateTime<Utc>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            completed: 0,
            generation_calls: 0,
            tokens_used: 0,
            started_at: Utc::now(),
        }
    }
}

/// Where one session stands in the item stream.
#[derive(Debug)]
pub struct SessionCursor {
    pub file_id: i64,
    pub stage_filter: Option<Stage>,
    /// Last page fetched; 0 means no page yet.
    pub page: u32,
    /// Next scan position within `page_items`.
    pub index: usize,
    /// Cached items of the current page.
    pub page_items: Vec<WorkItem>,
    /// Batch currently being worked through, if any.
    pub batch: Option<Batch>,
    /// Position of the next item to present within the batch.
    pub batch_pos: usize,
    /// Items assembled but not yet generated for, kept when a generation
    /// attempt fails so the next attempt reuses them (their locks are
    /// already held).
    pub pending: Vec<WorkItem>,
    pub stats: SessionStats,
}

impl SessionCursor {
    pub fn new(file_id: i64, stage_filter: Option<Stage>) -> Self {
        Self {
            file_id,
            stage_filter,
            page: 0,
            index: 0,
            page_items: Vec::new(),
            batch: None,
            batch_pos: 0,
            pending: Vec::new(),
            stats: SessionStats::new(),
        }
    }

    /// The batch item the session is currently deciding on, if any.
    pub fn current(&self) -> Option<&BatchItem> {
        self.batch.as_ref()?.items.get(self.batch_pos)
    }

    /// Install a freshly generated batch, resetting the presentation position.
    pub fn install_batch(&mut self, batch: Batch) {
        debug_assert!(!batch.is_empty());
        self.batch = Some(batch);
        self.batch_pos = 0;
    }

    /// Step past the current batch item.
    pub fn advance(&mut self) {
        self.batch_pos += 1;
    }
}
