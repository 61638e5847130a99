//! Batch assembly: claiming the next run of workable items for a session.
//!
//! The assembler scans forward from the session's cursor, skipping empty
//! rows and items locked by other sessions, turning store pages as the scan
//! reaches their end. A bounded scan budget keeps a fill from spinning when
//! everything ahead is held by someone else; the caller can tell that
//! situation apart from genuine end of data.

use std::time::Instant;

use tracing::{debug, info};

use super::cursor::{SessionCursor, SessionStats};
use super::locks::LockTable;
use crate::store::{ItemSource, StoreError, WorkItem};

/// Bounds for one fill pass.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Maximum items per batch.
    pub batch_size: usize,
    /// Skipped items (empty rows, foreign locks) tolerated before giving up.
    pub scan_budget: u32,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            scan_budget: 100,
        }
    }
}

/// Result of one fill pass.
#[derive(Debug)]
pub enum FillOutcome {
    /// Items claimed for this session, in scan order, each holding a lock.
    Filled(Vec<WorkItem>),
    /// The item stream is exhausted; final counters attached.
    Completed(SessionStats),
    /// The scan budget ran out without claiming anything. Everything
    /// scanned is held by other sessions; worth retrying shortly.
    Contended,
}

/// Claim up to `config.batch_size` items for `session`, advancing the
/// cursor past everything scanned and turning pages as needed.
pub async fn fill_batch<S: ItemSource>(
    source: &S,
    locks: &LockTable,
    cursor: &mut SessionCursor,
    session: &str,
    config: &AssemblerConfig,
) -> Result<FillOutcome, StoreError> {
    let mut picked: Vec<WorkItem> = Vec::new();
    let mut scanned = 0u32;
    let mut end_of_data = false;

    while picked.len() < config.batch_size && scanned < config.scan_budget {
        if cursor.index >= cursor.page_items.len() {
            let next_page = cursor.page + 1;
            let items = source
                .fetch_page(cursor.file_id, cursor.stage_filter, next_page)
                .await?;
            if items.is_empty() {
                end_of_data = true;
                break;
            }
            info!(page = next_page, count = items.len(), "page loaded");
            cursor.page = next_page;
            cursor.page_items = items;
            cursor.index = 0;
        }

        let item = cursor.page_items[cursor.index].clone();
        cursor.index += 1;

        if item.source.is_empty() {
            scanned += 1;
            continue;
        }

        if locks.acquire(item.id, session, Instant::now()) {
            picked.push(item);
        } else {
            debug!(item_id = item.id, "held by another session, skipped");
            scanned += 1;
        }
    }

    if !picked.is_empty() {
        debug!(session, count = picked.len(), "batch assembled");
        Ok(FillOutcome::Filled(picked))
    } else if end_of_data {
        info!(session, completed = cursor.stats.completed, "item stream exhausted");
        Ok(FillOutcome::Completed(cursor.stats.clone()))
    } else {
        Ok(FillOutcome::Contended)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::{FileEntry, Stage};

    /// Fixed pages; anything past the last page is empty.
    struct PagedSource {
        pages: Vec<Vec<WorkItem>>,
    }

    impl ItemSource for PagedSource {
        async fn list_files(&self) -> Result<Vec<FileEntry>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_page(
            &self,
            _file_id: i64,
            _stage_filter: Option<Stage>,
            page: u32,
        ) -> Result<Vec<WorkItem>, StoreError> {
            Ok(self
                .pages
                .get((page - 1) as usize)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn item(id: i64) -> WorkItem {
        WorkItem {
            id,
            source: format!("text {id}"),
            context: None,
            stage: Stage::Untranslated,
        }
    }

    fn empty_item(id: i64) -> WorkItem {
        WorkItem {
            id,
            source: String::new(),
            context: None,
            stage: Stage::Untranslated,
        }
    }

    fn locks() -> LockTable {
        LockTable::new(Duration::from_secs(300))
    }

    fn pages_of(ids: impl IntoIterator<Item = Vec<i64>>) -> PagedSource {
        PagedSource {
            pages: ids
                .into_iter()
                .map(|page| page.into_iter().map(item).collect())
                .collect(),
        }
    }

    #[tokio::test]
    async fn fills_a_batch_from_the_first_page() {
        let source = pages_of([vec![1, 2, 3]]);
        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);

        let outcome = fill_batch(&source, &locks, &mut cursor, "alice", &AssemblerConfig::default())
            .await
            .unwrap();

        match outcome {
            FillOutcome::Filled(items) => {
                assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
            }
            other => panic!("expected Filled, got {other:?}"),
        }
        // Every batched item holds this session's lock.
        let now = Instant::now();
        for id in [1, 2, 3] {
            assert_eq!(locks.holder_of(id, now), Some("alice".to_string()));
        }
    }

    #[tokio::test]
    async fn never_exceeds_the_batch_bound() {
        let source = pages_of([(1..=30).collect::<Vec<_>>()]);
        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);
        let config = AssemblerConfig {
            batch_size: 20,
            ..AssemblerConfig::default()
        };

        let outcome = fill_batch(&source, &locks, &mut cursor, "alice", &config)
            .await
            .unwrap();

        match outcome {
            FillOutcome::Filled(items) => assert_eq!(items.len(), 20),
            other => panic!("expected Filled, got {other:?}"),
        }
        assert_eq!(cursor.index, 20);
    }

    #[tokio::test]
    async fn skips_empty_source_texts_without_locking() {
        let source = PagedSource {
            pages: vec![vec![item(1), empty_item(2), item(3)]],
        };
        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);

        let outcome = fill_batch(&source, &locks, &mut cursor, "alice", &AssemblerConfig::default())
            .await
            .unwrap();

        match outcome {
            FillOutcome::Filled(items) => {
                assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
            }
            other => panic!("expected Filled, got {other:?}"),
        }
        assert_eq!(locks.holder_of(2, Instant::now()), None);
    }

    #[tokio::test]
    async fn skips_items_locked_by_other_sessions() {
        let source = pages_of([vec![1, 2, 3]]);
        let locks = locks();
        assert!(locks.acquire(2, "bob", Instant::now()));
        let mut cursor = SessionCursor::new(7, None);

        let outcome = fill_batch(&source, &locks, &mut cursor, "alice", &AssemblerConfig::default())
            .await
            .unwrap();

        match outcome {
            FillOutcome::Filled(items) => {
                assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
            }
            other => panic!("expected Filled, got {other:?}"),
        }
        assert_eq!(locks.holder_of(2, Instant::now()), Some("bob".to_string()));
    }

    #[tokio::test]
    async fn spans_pages_when_the_current_page_runs_out() {
        let source = pages_of([vec![1, 2, 3], vec![4, 5, 6]]);
        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);
        let config = AssemblerConfig {
            batch_size: 5,
            ..AssemblerConfig::default()
        };

        let outcome = fill_batch(&source, &locks, &mut cursor, "alice", &config)
            .await
            .unwrap();

        match outcome {
            FillOutcome::Filled(items) => {
                assert_eq!(
                    items.iter().map(|i| i.id).collect::<Vec<_>>(),
                    vec![1, 2, 3, 4, 5]
                );
            }
            other => panic!("expected Filled, got {other:?}"),
        }
        assert_eq!(cursor.page, 2);
        assert_eq!(cursor.index, 2);
    }

    #[tokio::test]
    async fn drains_three_pages_in_three_batches_then_signals_completion() {
        let source = pages_of([
            (1..=20).collect::<Vec<_>>(),
            (21..=40).collect::<Vec<_>>(),
            (41..=60).collect::<Vec<_>>(),
        ]);
        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);
        let config = AssemblerConfig {
            batch_size: 20,
            ..AssemblerConfig::default()
        };

        let mut seen = Vec::new();
        for _ in 0..3 {
            match fill_batch(&source, &locks, &mut cursor, "alice", &config)
                .await
                .unwrap()
            {
                FillOutcome::Filled(items) => {
                    assert_eq!(items.len(), 20);
                    seen.extend(items.iter().map(|i| i.id));
                }
                other => panic!("expected Filled, got {other:?}"),
            }
        }

        // All 60 items, no repeats, no omissions.
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, (1..=60).collect::<Vec<_>>());

        match fill_batch(&source, &locks, &mut cursor, "alice", &config)
            .await
            .unwrap()
        {
            FillOutcome::Completed(_) => {}
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn two_sessions_racing_for_one_item_produce_one_winner() {
        let source = pages_of([vec![1]]);
        let locks = locks();
        let mut cursor_a = SessionCursor::new(7, None);
        let mut cursor_b = SessionCursor::new(7, None);
        let config = AssemblerConfig::default();

        let (a, b) = tokio::join!(
            fill_batch(&source, &locks, &mut cursor_a, "alice", &config),
            fill_batch(&source, &locks, &mut cursor_b, "bob", &config),
        );

        let included = |outcome: &FillOutcome| match outcome {
            FillOutcome::Filled(items) => items.iter().filter(|i| i.id == 1).count(),
            _ => 0,
        };
        assert_eq!(included(&a.unwrap()) + included(&b.unwrap()), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_with_nothing_acquired_reports_contention() {
        let source = pages_of([(1..=10).collect::<Vec<_>>(), (11..=20).collect::<Vec<_>>()]);
        let locks = locks();
        let now = Instant::now();
        for id in 1..=20 {
            assert!(locks.acquire(id, "bob", now));
        }
        let mut cursor = SessionCursor::new(7, None);
        let config = AssemblerConfig {
            batch_size: 20,
            scan_budget: 5,
        };

        match fill_batch(&source, &locks, &mut cursor, "alice", &config)
            .await
            .unwrap()
        {
            FillOutcome::Contended => {}
            other => panic!("expected Contended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn end_of_data_with_nothing_acquired_reports_completion() {
        // One contested item, then the stream ends: that is completion for
        // this session, not contention.
        let source = pages_of([vec![1]]);
        let locks = locks();
        assert!(locks.acquire(1, "bob", Instant::now()));
        let mut cursor = SessionCursor::new(7, None);

        match fill_batch(&source, &locks, &mut cursor, "alice", &AssemblerConfig::default())
            .await
            .unwrap()
        {
            FillOutcome::Completed(_) => {}
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn page_fetch_failures_propagate() {
        struct FailingSource;
        impl ItemSource for FailingSource {
            async fn list_files(&self) -> Result<Vec<FileEntry>, StoreError> {
                Ok(Vec::new())
            }
            async fn fetch_page(
                &self,
                _file_id: i64,
                _stage_filter: Option<Stage>,
                _page: u32,
            ) -> Result<Vec<WorkItem>, StoreError> {
                Err(StoreError::Api {
                    status: 503,
                    message: "unavailable".into(),
                })
            }
        }

        let locks = locks();
        let mut cursor = SessionCursor::new(7, None);
        let err = fill_batch(
            &FailingSource,
            &locks,
            &mut cursor,
            "alice",
            &AssemblerConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 503, .. }));
    }
}
