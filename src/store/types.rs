//! Data types for the remote item store.
//!
//! Work items and file entries mirror the ParaTranz API payloads; stage
//! values outside the three the coordinator understands are carried through
//! untouched so unknown lifecycle states survive a round trip.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a work item.
///
/// The store encodes stages as bare integers (0 untranslated, 1 translated,
/// 5 reviewed). Anything else is preserved as [`Stage::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Stage {
    Untranslated,
    Translated,
    Reviewed,
    Other(i64),
}

impl From<i64> for Stage {
    fn from(raw: i64) -> Self {
        match raw {
            0 => Stage::Untranslated,
            1 => Stage::Translated,
            5 => Stage::Reviewed,
            other => Stage::Other(other),
        }
    }
}

impl From<Stage> for i64 {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Untranslated => 0,
            Stage::Translated => 1,
            Stage::Reviewed => 5,
            Stage::Other(raw) => raw,
        }
    }
}

/// One unit of translatable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Identifier, unique within the project.
    pub id: i64,
    /// Source text to translate. May be empty for placeholder rows.
    pub source: String,
    /// Optional context hint attached by the project maintainers.
    pub context: Option<String>,
    /// Current lifecycle stage.
    pub stage: Stage,
}

/// A translatable file of the project, with progress counts.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub translated: u64,
}

impl FileEntry {
    /// Translated fraction in percent, 0 when the file is empty.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.translated as f64 / self.total as f64 * 100.0
        }
    }
}
