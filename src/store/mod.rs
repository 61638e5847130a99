//! Remote item store access.
//!
//! The coordinator reads work items from, and writes finished translations
//! back to, a ParaTranz-style content-management API. The [`ItemSource`] and
//! [`ItemSink`] traits are the narrow seams the core consumes;
//! [`ParatranzClient`] is the HTTP implementation of both.

pub mod client;
pub mod error;
pub mod types;

pub use client::ParatranzClient;
pub use error::StoreError;
pub use types::{FileEntry, Stage, WorkItem};

/// Paginated read access to remote work items.
pub trait ItemSource {
    /// List the translatable files of the project.
    async fn list_files(&self) -> Result<Vec<FileEntry>, StoreError>;

    /// Fetch one page of work items for a file, optionally filtered by
    /// lifecycle stage. Pages are 1-based; an empty page signals end of data.
    async fn fetch_page(
        &self,
        file_id: i64,
        stage_filter: Option<Stage>,
        page: u32,
    ) -> Result<Vec<WorkItem>, StoreError>;
}

/// Write-back of a finished translation plus its new lifecycle stage.
pub trait ItemSink {
    /// Persist `text` as the translation for `item_id`. With `as_review` the
    /// item moves to the reviewed stage, otherwise to translated.
    async fn write_back(&self, item_id: i64, text: &str, as_review: bool)
    -> Result<(), StoreError>;
}
