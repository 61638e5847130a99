//! Command-line interface, clap based.
//!
//! Defines the [`Cli`] struct with subcommands [`Command`] (files, run,
//! glossary) and the global --verbose flag.

use clap::{Parser, Subcommand, ValueEnum};

use crate::store::Stage;

/// Collaborative translation review coordinator.
#[derive(Debug, Parser)]
#[command(name = "tandem", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Stage filter accepted by the CLI, mapped to [`Stage`] internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    /// All items regardless of stage.
    All,
    /// Items without a translation yet.
    Untranslated,
    /// Items with an unreviewed translation.
    Translated,
    /// Items whose translation has been reviewed.
    Reviewed,
}

impl StageArg {
    pub fn to_filter(self) -> Option<Stage> {
        match self {
            StageArg::All => None,
            StageArg::Untranslated => Some(Stage::Untranslated),
            StageArg::Translated => Some(Stage::Translated),
            StageArg::Reviewed => Some(Stage::Reviewed),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the project's translatable files with progress.
    Files,

    /// Start an interactive review session.
    Run {
        /// File to work on; chosen interactively when omitted.
        #[arg(long)]
        file: Option<i64>,

        /// Lifecycle stage to work through.
        #[arg(long, value_enum, default_value = "untranslated")]
        stage: StageArg,

        /// Save accepted translations as reviewed instead of translated.
        #[arg(long, default_value_t = false)]
        review: bool,
    },

    /// Manage the glossary threaded into generation prompts.
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum GlossaryAction {
    /// Print all terms.
    List,
    /// Add or update a term.
    Set { term: String, translation: String },
    /// Remove a term.
    Remove { term: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["tandem", "run", "--file", "17", "--stage", "untranslated"]);
        match cli.command {
            Command::Run { file, stage, review } => {
                assert_eq!(file, Some(17));
                assert_eq!(stage, StageArg::Untranslated);
                assert!(!review);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_run_defaults() {
        let cli = Cli::parse_from(["tandem", "run"]);
        match cli.command {
            Command::Run { file, stage, .. } => {
                assert!(file.is_none());
                assert_eq!(stage, StageArg::Untranslated);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_global_verbose_flag() {
        let cli = Cli::parse_from(["tandem", "--verbose", "files"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Files));
    }

    #[test]
    fn cli_parses_glossary_set() {
        let cli = Cli::parse_from(["tandem", "glossary", "set", "Brake", "브레이크"]);
        match cli.command {
            Command::Glossary {
                action: GlossaryAction::Set { term, translation },
            } => {
                assert_eq!(term, "Brake");
                assert_eq!(translation, "브레이크");
            }
            _ => panic!("expected Glossary set"),
        }
    }

    #[test]
    fn stage_arg_maps_to_filter() {
        assert_eq!(StageArg::All.to_filter(), None);
        assert_eq!(StageArg::Untranslated.to_filter(), Some(Stage::Untranslated));
        assert_eq!(StageArg::Translated.to_filter(), Some(Stage::Translated));
        assert_eq!(StageArg::Reviewed.to_filter(), Some(Stage::Reviewed));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
