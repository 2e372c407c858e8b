//! `plan`, `apply` and `destroy`

use anyhow::{Result, bail};

use super::{connect, load_desired, load_state};
use crate::Context;
use crate::config::Desired;
use crate::engine::differ::{compute_diffs, display_diff};
use crate::engine::{self, RunOptions, Target};
use crate::ui;

fn parse_target(target: Option<&str>) -> Result<Option<Target>> {
    target.map(Target::parse).transpose()
}

/// Show what apply would change
pub fn plan(ctx: &Context, target: Option<&str>, refresh: bool) -> Result<()> {
    let target = parse_target(target)?;
    let desired = load_desired(ctx)?;
    let mut state = load_state(ctx)?;
    let controllers = connect(ctx, &desired)?;

    if refresh {
        super::refresh::refresh_all(&controllers, &mut state, target.as_ref())?;
    }

    let changes = controllers.plan(&desired, &state, target.as_ref())?;
    display_diff(&compute_diffs(&changes));
    Ok(())
}

/// Make the remote objects match the configuration
pub fn apply(
    ctx: &Context,
    target: Option<&str>,
    refresh: bool,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let target = parse_target(target)?;
    let desired = load_desired(ctx)?;
    let mut state = load_state(ctx)?;
    let controllers = connect(ctx, &desired)?;

    if refresh {
        super::refresh::refresh_all(&controllers, &mut state, target.as_ref())?;
        state.save()?;
    }

    let changes = controllers.plan(&desired, &state, target.as_ref())?;
    let summary = engine::run(changes, &mut state, &options(ctx, yes, dry_run))?;
    if !summary.is_success() {
        bail!("{} change(s) failed", summary.failed);
    }
    Ok(())
}

/// Destroy every tracked object (or the targeted ones)
pub fn destroy(ctx: &Context, target: Option<&str>, yes: bool) -> Result<()> {
    let target = parse_target(target)?;
    let desired = load_desired(ctx)?;
    let mut state = load_state(ctx)?;

    if state.is_empty() {
        ui::info("Nothing is tracked; nothing to destroy.");
        return Ok(());
    }

    let controllers = connect(ctx, &desired)?;
    // Everything tracked is an orphan of an empty configuration
    let nothing = Desired {
        provider: desired.provider,
        ..Desired::default()
    };
    let changes = controllers.plan(&nothing, &state, target.as_ref())?;
    let summary = engine::run(changes, &mut state, &options(ctx, yes, false))?;
    if !summary.is_success() {
        bail!("{} change(s) failed", summary.failed);
    }
    Ok(())
}

fn options(ctx: &Context, yes: bool, dry_run: bool) -> RunOptions {
    RunOptions {
        dry_run,
        yes,
        verbose: ctx.verbose > 0,
        quiet: ctx.quiet,
    }
}
