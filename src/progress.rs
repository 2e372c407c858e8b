//! Progress reporting for apply runs

use colored::Colorize;
use declarative::{Action, ApplyResult, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar with one line per finished change
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

pub fn result_symbol(result: &ApplyResult) -> colored::ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created | ApplyResult::Updated | ApplyResult::Replaced => "✓".green(),
        ApplyResult::Deleted => "✓".red(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

fn describe(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "unchanged".into(),
        ApplyResult::Created => "created".into(),
        ApplyResult::Updated => "updated".into(),
        ApplyResult::Replaced => "replaced".into(),
        ApplyResult::Deleted => "destroyed".into(),
        ApplyResult::Failed { error } => format!("failed: {error}"),
        ApplyResult::Skipped { reason } => format!("skipped: {reason}"),
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress template is valid")
                .progress_chars("=>-"),
        );
        self.bar = Some(bar);
    }

    fn on_change_start(&mut self, address: &str, action: &Action) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {address}", action.symbol()));
        }
    }

    fn on_change_complete(&mut self, address: &str, result: &ApplyResult) {
        if !self.quiet || !result.is_success() {
            self.println(format!(
                "  {} {address} {}",
                result_symbol(result),
                describe(result).dimmed()
            ));
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_results() {
        assert_eq!(describe(&ApplyResult::Replaced), "replaced");
        assert_eq!(
            describe(&ApplyResult::Failed {
                error: "boom".into()
            }),
            "failed: boom"
        );
    }

    #[test]
    fn test_quiet_progress_has_no_bar() {
        let mut progress = BarProgress::new(true);
        progress.on_batch_start(3);
        assert!(progress.bar.is_none());
        progress.on_change_complete("site.a", &ApplyResult::Created);
        progress.on_batch_complete();
    }
}
