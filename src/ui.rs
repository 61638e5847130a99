//! Terminal output for the interactive session: spinners and colored text.
//!
//! Uses `indicatif` for the fetch/generate spinner and `console` for
//! styling. All rendering for the operator loop goes through [`Screen`] so
//! the control flow in `console` stays free of formatting noise.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::coordinator::{ItemView, SessionStats};
use crate::store::FileEntry;

const RULE_WIDTH: usize = 70;

/// Styled terminal output for the operator loop.
pub struct Screen {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
    dim: Style,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    fn rule(&self) {
        println!("{}", self.dim.apply_to("─".repeat(RULE_WIDTH)));
    }

    pub fn show_files(&self, files: &[FileEntry]) {
        self.rule();
        println!("{}", self.cyan.apply_to("Translatable files"));
        self.rule();
        for (i, file) in files.iter().enumerate() {
            println!("[{}] {}", i + 1, file.name);
            println!(
                "    {}",
                self.dim.apply_to(format!(
                    "id {} | progress {}/{} ({:.1}%)",
                    file.id,
                    file.translated,
                    file.total,
                    file.progress()
                ))
            );
        }
        self.rule();
    }

    pub fn show_item(&self, view: &ItemView) {
        println!();
        self.rule();
        println!(
            "{}  {}",
            self.cyan
                .apply_to(format!("Source [{}/{}]", view.position, view.batch_len)),
            self.dim.apply_to(format!(
                "item {} | saved {} total",
                view.item_id, view.stats.completed
            ))
        );
        self.rule();
        println!("{}", view.source);
        if let Some(context) = &view.context {
            println!("{}", self.dim.apply_to(format!("context: {context}")));
        }
        self.rule();
        if view.candidates.fallback {
            println!(
                "{}",
                self.yellow
                    .apply_to("Candidates could not be generated for this item; edit or skip.")
            );
        }
        println!("[1] {}", view.candidates.first);
        println!("[2] {}", view.candidates.second);
        self.rule();
    }

    pub fn show_stats(&self, stats: &SessionStats) {
        println!();
        self.rule();
        println!("{}", self.green.apply_to("Session summary"));
        println!("  saved:            {}", stats.completed);
        println!("  generation calls: {}", stats.generation_calls);
        println!("  tokens used:      {}", stats.tokens_used);
        println!(
            "  started:          {}",
            stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.rule();
    }

    pub fn success(&self, msg: &str) {
        println!("{} {msg}", self.green.apply_to("✓"));
    }

    pub fn warn(&self, msg: &str) {
        println!("{} {msg}", self.yellow.apply_to("!"));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{} {msg}", self.red.apply_to("✗"));
    }
}

/// Spinner shown while the next item is fetched and candidates generated.
pub struct FetchSpinner {
    pb: ProgressBar,
}

impl FetchSpinner {
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message("fetching next item...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}
