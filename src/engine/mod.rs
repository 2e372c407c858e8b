//! Reconciliation engine
//!
//! 1. Planning - pair each declared record with its state and plan a change
//! 2. Diffing - render the planned actions
//! 3. Executing - apply changes in order, saving state after each one

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{RunOptions, run};
pub use planner::{Controllers, Target, address};
