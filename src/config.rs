//! Configuration loaded from `tandem.toml`.
//!
//! [`TandemConfig`] carries the store credentials, the generation engine
//! settings, the translation style threaded into prompts, and the
//! coordinator tuning knobs. Values absent from the file use defaults.
//! The `PARATRANZ_API_KEY` and `GENERATION_API_KEY` environment variables
//! take precedence over the file for the two secrets.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Top-level configuration loaded from `tandem.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TandemConfig {
    #[serde(default)]
    pub paratranz: ParatranzConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub translation: TranslationStyle,

    #[serde(default)]
    pub coordinator: CoordinatorSettings,

    #[serde(default)]
    pub glossary: GlossaryConfig,
}

/// Credentials and project selection for the remote item store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParatranzConfig {
    /// API key for the ParaTranz project. Overridden by `PARATRANZ_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// Numeric project identifier.
    #[serde(default)]
    pub project_id: i64,
}

/// Settings for the candidate-generation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// API key for the generation engine. Overridden by `GENERATION_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent with each generation request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Token budget for one batch response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Translation context assembled into every generation prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationStyle {
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "default_game_genre")]
    pub game_genre: String,

    #[serde(default = "default_tone")]
    pub tone: String,

    #[serde(default = "default_formality")]
    pub formality: String,

    #[serde(default = "default_target_audience")]
    pub target_audience: String,
}

/// Tuning knobs for the work-distribution core.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSettings {
    /// Items assembled and generated per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Items a single fill may scan past before giving up.
    #[serde(default = "default_scan_budget")]
    pub scan_budget: u32,

    /// Seconds before an abandoned item lock expires.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    /// Retries after a rate-limited generation call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wait before retrying when the engine gives no hint.
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
}

/// Glossary file location and initial contents.
#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryConfig {
    /// Path of the persisted glossary JSON file.
    #[serde(default = "default_glossary_path")]
    pub path: String,

    /// Terms seeded when no glossary file exists yet.
    #[serde(default)]
    pub seed: BTreeMap<String, String>,
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_source_lang() -> String {
    "English".to_string()
}

fn default_target_lang() -> String {
    "Korean".to_string()
}

fn default_game_genre() -> String {
    "racing game".to_string()
}

fn default_tone() -> String {
    "concise and energetic".to_string()
}

fn default_formality() -> String {
    "polite".to_string()
}

fn default_target_audience() -> String {
    "players of all ages".to_string()
}

fn default_batch_size() -> usize {
    20
}

fn default_scan_budget() -> u32 {
    100
}

fn default_lock_timeout_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit_wait_secs() -> u64 {
    60
}

fn default_glossary_path() -> String {
    "tandem_glossary.json".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for TranslationStyle {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            game_genre: default_game_genre(),
            tone: default_tone(),
            formality: default_formality(),
            target_audience: default_target_audience(),
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            scan_budget: default_scan_budget(),
            lock_timeout_secs: default_lock_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
        }
    }
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            path: default_glossary_path(),
            seed: BTreeMap::new(),
        }
    }
}

impl TandemConfig {
    /// Load the configuration from `tandem.toml` in the current directory.
    /// Uses defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("tandem.toml"))
    }

    fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<TandemConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment variables take precedence over the file for secrets.
        if let Ok(key) = std::env::var("PARATRANZ_API_KEY")
            && !key.is_empty()
        {
            config.paratranz.api_key = key;
        }
        if let Ok(key) = std::env::var("GENERATION_API_KEY")
            && !key.is_empty()
        {
            config.generation.api_key = key;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TandemConfig::default();
        assert_eq!(config.coordinator.batch_size, 20);
        assert_eq!(config.coordinator.scan_budget, 100);
        assert_eq!(config.coordinator.lock_timeout_secs, 300);
        assert_eq!(config.coordinator.max_retries, 3);
        assert_eq!(config.coordinator.rate_limit_wait_secs, 60);
        assert_eq!(config.glossary.path, "tandem_glossary.json");
        assert!(config.paratranz.api_key.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            [paratranz]
            api_key = "pt-test-123"
            project_id = 4821

            [coordinator]
            batch_size = 10

            [glossary.seed]
            "Brake" = "브레이크"
        "#;
        let config: TandemConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.paratranz.api_key, "pt-test-123");
        assert_eq!(config.paratranz.project_id, 4821);
        assert_eq!(config.coordinator.batch_size, 10);
        assert_eq!(config.coordinator.scan_budget, 100);
        assert_eq!(config.glossary.seed.get("Brake").unwrap(), "브레이크");
    }

    #[test]
    fn translation_style_defaults() {
        let style = TranslationStyle::default();
        assert_eq!(style.source_lang, "English");
        assert_eq!(style.target_lang, "Korean");
        assert!(!style.tone.is_empty());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let config = TandemConfig::load_from(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.coordinator.max_retries, 3);
    }
}
