//! File-backed glossary persistence.
//!
//! The glossary is a source-term → target-term mapping kept as pretty JSON
//! on disk. It is read once at startup, threaded into every generation
//! prompt, and written back whenever an operator edits a term.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::error::TandemError;

/// Source-term → target-term mapping.
pub type Glossary = BTreeMap<String, String>;

/// Loads and saves the glossary JSON file.
pub struct GlossaryStore {
    path: PathBuf,
}

impl GlossaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the glossary, falling back to `seed` when the file is missing
    /// or unreadable.
    pub fn load(&self, seed: &Glossary) -> Glossary {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(glossary) => glossary,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "glossary file unreadable, using seed");
                    seed.clone()
                }
            },
            Err(_) => seed.clone(),
        }
    }

    /// Persist the glossary as pretty JSON.
    pub fn save(&self, glossary: &Glossary) -> Result<(), TandemError> {
        let json = serde_json::to_string_pretty(glossary)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
