//! The operator-facing coordination service.
//!
//! One instance serves every connected operator. Sessions are keyed by an
//! opaque identifier; each holds its own cursor and counters, while the
//! lock table is shared so no two sessions are ever assigned the same item.
//! A transport layer (HTTP handlers, a console loop) is expected to call
//! these methods with one request in flight per session at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use super::assembler::{AssemblerConfig, FillOutcome, fill_batch};
use super::cursor::{Batch, SessionCursor, SessionStats};
use super::locks::LockTable;
use super::recorder::{self, DecideOutcome, Decision};
use crate::config::{CoordinatorSettings, TranslationStyle};
use crate::error::TandemError;
use crate::gateway::{CandidateGenerator, CandidatePair, RetryPolicy, generate_with_retry};
use crate::glossary::{Glossary, GlossaryStore};
use crate::store::{FileEntry, ItemSink, ItemSource, Stage};

/// What the session gets when it asks for its next item.
#[derive(Debug)]
pub enum NextItem {
    Item(ItemView),
    /// The item stream is drained; final counters attached.
    Completed(SessionStats),
    /// Everything scanned is held by other sessions; retry shortly.
    Contended,
}

/// One batch item as presented to the operator.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub item_id: i64,
    pub source: String,
    pub context: Option<String>,
    pub candidates: CandidatePair,
    /// 1-based position within the current batch.
    pub position: usize,
    pub batch_len: usize,
    pub stats: SessionStats,
}

/// Coordinates batch assembly, candidate generation, and decision recording
/// across concurrent operator sessions.
pub struct CoordinatorService<C, G> {
    store: C,
    generator: G,
    locks: LockTable,
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<SessionCursor>>>>,
    glossary: Mutex<Glossary>,
    glossary_store: GlossaryStore,
    style: TranslationStyle,
    assembler: AssemblerConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl<C, G> CoordinatorService<C, G>
where
    C: ItemSource + ItemSink,
    G: CandidateGenerator,
{
    pub fn new(
        store: C,
        generator: G,
        settings: &CoordinatorSettings,
        style: TranslationStyle,
        glossary_store: GlossaryStore,
        glossary_seed: &Glossary,
    ) -> Self {
        let glossary = glossary_store.load(glossary_seed);
        Self {
            store,
            generator,
            locks: LockTable::new(Duration::from_secs(settings.lock_timeout_secs)),
            sessions: Mutex::new(HashMap::new()),
            glossary: Mutex::new(glossary),
            glossary_store,
            style,
            assembler: AssemblerConfig {
                batch_size: settings.batch_size,
                scan_budget: settings.scan_budget,
            },
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                default_wait: Duration::from_secs(settings.rate_limit_wait_secs),
            },
            cancel: CancellationToken::new(),
        }
    }

    /// Mint an opaque session identifier for a newly connected operator.
    pub fn new_session(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Interrupt any in-progress rate-limit waits (operator shutdown).
    pub fn cancel_waits(&self) {
        self.cancel.cancel();
    }

    pub async fn list_files(&self) -> Result<Vec<FileEntry>, TandemError> {
        Ok(self.store.list_files().await?)
    }

    /// Point `session` at the start of a file's item stream. Any previous
    /// cursor for the session is discarded; its locks simply expire.
    pub fn start(&self, session: &str, file_id: i64, stage_filter: Option<Stage>) {
        let cursor = Arc::new(tokio::sync::Mutex::new(SessionCursor::new(
            file_id,
            stage_filter,
        )));
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.to_string(), cursor);
        info!(session, file_id, "session started");
    }

    /// Serve the session's next work item, assembling and generating a new
    /// batch when the current one is exhausted.
    pub async fn next_item(&self, session: &str) -> Result<NextItem, TandemError> {
        let cursor = self.cursor_for(session)?;
        let mut cursor = cursor.lock().await;

        loop {
            if cursor.current().is_some() {
                return Ok(NextItem::Item(Self::view(&cursor)));
            }

            // A batch whose generation failed last time is retried with the
            // same items; their locks are still held by this session.
            let items = if cursor.pending.is_empty() {
                match fill_batch(&self.store, &self.locks, &mut cursor, session, &self.assembler)
                    .await?
                {
                    FillOutcome::Contended => return Ok(NextItem::Contended),
                    FillOutcome::Completed(stats) => return Ok(NextItem::Completed(stats)),
                    FillOutcome::Filled(items) => items,
                }
            } else {
                std::mem::take(&mut cursor.pending)
            };

            let texts: Vec<String> = items.iter().map(|item| item.source.clone()).collect();
            let glossary = self.glossary();
            // The batch's locks are held across this wait; the lock table
            // itself is untouched until the next fill.
            let outcome = match generate_with_retry(
                &self.generator,
                &texts,
                &glossary,
                &self.style,
                &self.retry,
                &self.cancel,
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    cursor.pending = items;
                    return Err(e.into());
                }
            };
            cursor.stats.generation_calls += u64::from(outcome.attempts);
            cursor.stats.tokens_used += outcome.usage.total();
            cursor.install_batch(Batch::from_parts(items, outcome.pairs));
        }
    }

    /// Apply the operator's decision to the session's current item.
    pub async fn decide(
        &self,
        session: &str,
        decision: Decision,
        as_review: bool,
    ) -> Result<DecideOutcome, TandemError> {
        let cursor = self.cursor_for(session)?;
        let mut cursor = cursor.lock().await;
        recorder::decide(
            &self.store,
            &self.locks,
            &mut cursor,
            session,
            decision,
            as_review,
        )
        .await
    }

    /// Abandon the pending save. The item stays locked and current, so the
    /// operator can decide again.
    pub fn cancel_save(&self, session: &str) -> Result<(), TandemError> {
        self.cursor_for(session).map(|_| ())
    }

    /// Snapshot of the session's counters.
    pub async fn stats(&self, session: &str) -> Result<SessionStats, TandemError> {
        let cursor = self.cursor_for(session)?;
        let cursor = cursor.lock().await;
        Ok(cursor.stats.clone())
    }

    /// Current glossary contents.
    pub fn glossary(&self) -> Glossary {
        self.glossary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Insert or update a glossary term and persist the file.
    pub fn set_term(&self, term: &str, translation: &str) -> Result<(), TandemError> {
        let snapshot = {
            let mut glossary = self.glossary.lock().unwrap_or_else(PoisonError::into_inner);
            glossary.insert(term.to_string(), translation.to_string());
            glossary.clone()
        };
        self.glossary_store.save(&snapshot)
    }

    /// Remove a glossary term and persist the file. Returns whether the
    /// term existed.
    pub fn remove_term(&self, term: &str) -> Result<bool, TandemError> {
        let (existed, snapshot) = {
            let mut glossary = self.glossary.lock().unwrap_or_else(PoisonError::into_inner);
            let existed = glossary.remove(term).is_some();
            (existed, glossary.clone())
        };
        if existed {
            self.glossary_store.save(&snapshot)?;
        }
        Ok(existed)
    }

    fn cursor_for(
        &self,
        session: &str,
    ) -> Result<Arc<tokio::sync::Mutex<SessionCursor>>, TandemError> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
            .ok_or_else(|| TandemError::UnknownSession(session.to_string()))
    }

    fn view(cursor: &SessionCursor) -> ItemView {
        let batch_len = cursor.batch.as_ref().map(Batch::len).unwrap_or(0);
        let current = cursor
            .current()
            .expect("view() requires a current batch item");
        ItemView {
            item_id: current.item.id,
            source: current.item.source.clone(),
            context: current.item.context.clone(),
            candidates: current.candidates.clone(),
            position: cursor.batch_pos + 1,
            batch_len,
            stats: cursor.stats.clone(),
        }
    }
}
