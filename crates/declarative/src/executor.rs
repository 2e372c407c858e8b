//! Execution engine - applies planned changes one at a time

use crate::context::{ApplyContext, AutoConfirm, Change, ConfirmCallback, NoProgress, ProgressCallback};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;

/// Boxed change over a state store `S`
pub type BoxedChange<S> = Box<dyn Change<S>>;

/// Execute planned changes against `state`
///
/// Changes run sequentially in the given order. A failing change is
/// recorded as [`ApplyResult::Failed`] and execution moves on; the caller
/// decides what the summary means for its exit status.
///
/// # Type Parameters
/// * `S` - State store the changes write their results to
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
pub fn execute<S, P, C>(
    changes: Vec<BoxedChange<S>>,
    state: &mut S,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut summary = ExecuteSummary::default();
    let (noops, mut pending): (Vec<_>, Vec<_>) =
        changes.into_iter().partition(|c| c.action().is_noop());
    summary.no_change = noops.len();

    if pending.is_empty() || opts.dry_run {
        return Ok(summary);
    }

    if !confirm.confirm("Apply changes?")? {
        for change in &pending {
            log::debug!("Skipping {}", change.address());
            summary.add_result(&ApplyResult::Skipped {
                reason: "Declined".into(),
            });
        }
        return Ok(summary);
    }

    let ctx = ApplyContext::new(false, opts.verbose);
    progress.on_batch_start(pending.len());
    for change in &mut pending {
        progress.on_change_start(change.address(), change.action());
        let result = match change.apply(&ctx, state) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} failed: {e:#}", change.address());
                ApplyResult::Failed {
                    error: format!("{e:#}"),
                }
            }
        };
        progress.on_change_complete(change.address(), &result);
        summary.add_result(&result);
    }
    progress.on_batch_complete();

    Ok(summary)
}

/// Simple execution without callbacks
pub fn execute_simple<S>(
    changes: Vec<BoxedChange<S>>,
    state: &mut S,
    opts: &ExecuteOptions,
) -> Result<ExecuteSummary> {
    execute(changes, state, opts, &mut NoProgress, &mut AutoConfirm)
}
