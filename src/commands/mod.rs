//! Command implementations

pub mod import;
pub mod reconcile;
pub mod refresh;
pub mod show;

use anyhow::Result;
use kevelkit::{Backend, HttpBackend};
use std::sync::Arc;

use crate::Context;
use crate::config::{self, Desired};
use crate::engine::Controllers;
use crate::state::StateFile;

/// Load the desired-state file named on the command line
pub fn load_desired(ctx: &Context) -> Result<Desired> {
    Desired::load(&ctx.config)
}

pub fn load_state(ctx: &Context) -> Result<StateFile> {
    StateFile::load(&ctx.state)
}

/// Build the controllers over an HTTP backend
pub fn connect(ctx: &Context, desired: &Desired) -> Result<Controllers> {
    let settings = config::resolve(
        ctx.api_base_url.as_deref(),
        ctx.api_key.as_deref(),
        &desired.provider,
    )?;
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::with_api_base(
        settings.api_base_url,
        settings.api_key,
    ));
    Ok(Controllers::new(&backend))
}
