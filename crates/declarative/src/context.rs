//! Apply context and callback traits
//!
//! These traits keep the executor independent of any terminal UI.

use crate::diff::Action;
use crate::types::ApplyResult;
use anyhow::Result;

/// One planned change that the executor can apply against a state store `S`
///
/// Implementations own the planned record and write the outcome back into
/// the store: an apply that fails must leave the store untouched for that
/// address.
pub trait Change<S> {
    /// Local address, e.g. "site.main"
    fn address(&self) -> &str;

    /// Resource type name, e.g. "site"
    fn resource_type(&self) -> &'static str;

    /// The action this change performs
    fn action(&self) -> &Action;

    /// Perform the change
    fn apply(&mut self, ctx: &ApplyContext, state: &mut S) -> Result<ApplyResult>;
}

/// Progress callback for execution operations
pub trait ProgressCallback {
    /// Called once with the number of pending changes
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting to apply a single change
    fn on_change_start(&mut self, address: &str, action: &Action);

    /// Called when a change completes
    fn on_change_complete(&mut self, address: &str, result: &ApplyResult);

    /// Called when all changes were processed
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm; `true` means go ahead
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_change_start(&mut self, _address: &str, _action: &Action) {}
    fn on_change_complete(&mut self, _address: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to change apply operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
}

impl ApplyContext {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}
