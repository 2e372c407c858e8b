//! Apply runner with terminal confirmation and progress

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{
    AutoConfirm, BoxedChange, ConfirmCallback, ExecuteOptions, ExecuteSummary, NoProgress,
};

use super::differ::{compute_diffs, display_diff};
use crate::progress::BarProgress;
use crate::state::StateFile;

/// Options for an apply or destroy run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Show the plan and stop
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// Asks on the terminal through dialoguer
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}

/// Display the plan, confirm, and apply it against `state`
pub fn run(
    changes: Vec<BoxedChange<StateFile>>,
    state: &mut StateFile,
    opts: &RunOptions,
) -> Result<ExecuteSummary> {
    let diffs = compute_diffs(&changes);
    if !opts.quiet {
        display_diff(&diffs);
    }

    if diffs.is_empty() {
        return Ok(ExecuteSummary {
            no_change: changes.len(),
            ..ExecuteSummary::default()
        });
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(ExecuteSummary::default());
    }

    if !opts.yes && !console::Term::stdout().is_term() {
        bail!("Refusing to apply without --yes: stdout is not a terminal");
    }

    let execute_opts = ExecuteOptions {
        dry_run: false,
        verbose: opts.verbose,
    };
    println!();
    let summary = match (opts.yes, opts.quiet) {
        (true, true) => {
            declarative::execute(changes, state, &execute_opts, &mut NoProgress, &mut AutoConfirm)?
        }
        (true, false) => declarative::execute(
            changes,
            state,
            &execute_opts,
            &mut BarProgress::new(false),
            &mut AutoConfirm,
        )?,
        (false, quiet) => declarative::execute(
            changes,
            state,
            &execute_opts,
            &mut BarProgress::new(quiet),
            &mut PromptConfirm,
        )?,
    };

    print_summary(&summary);
    Ok(summary)
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.skipped > 0 && summary.total_changes() == 0 && summary.failed == 0 {
        println!("  {} Aborted", "✗".red());
    } else if summary.is_success() {
        println!("  {} Apply complete!", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} updated", summary.updated);
    }
    if summary.replaced > 0 {
        println!("    • {} replaced", summary.replaced);
    }
    if summary.deleted > 0 {
        println!("    • {} destroyed", summary.deleted);
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
