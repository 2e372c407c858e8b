//! # Declarative
//!
//! A framework for reconciling declared configuration with remote objects.
//!
//! ## Core Concepts
//!
//! - **Value**: a three-valued attribute (unknown, null, known)
//! - **Model**: a typed record whose attributes are reachable by name
//! - **Schema**: per-attribute annotations (required, optional, computed,
//!   optional+computed, replace-on-change)
//! - **Planner**: resolves configuration and prior state into a planned record
//! - **Diff**: decides between no-op, create, update, replace and delete
//! - **Executor**: applies planned changes in order, collecting a summary
//!
//! ## Callback Traits
//!
//! - [`Change`]: one planned change, applied against a caller-owned state store
//! - [`ProgressCallback`]: receives progress updates
//! - [`ConfirmCallback`]: handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! a specific UI or API client.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, Change, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{changed_attributes, group_by_type, plan_action, Action, DiffSummary, ResourceDiff};
pub use executor::{execute, execute_simple, BoxedChange};
pub use planner::{plan_record, PlanError};
pub use resource::{decode, Attribute, Mode, Model, ModelError, Schema};
pub use types::{ApplyResult, Dynamic, ExecuteOptions, ExecuteSummary, Value};
