//! `import` - attach an existing remote object to a local name

use anyhow::{Result, bail};

use super::{connect, load_desired, load_state};
use crate::Context;
use crate::config::check_name;
use crate::engine::{Controllers, address};
use crate::resource::{Controller, EntityKind};
use crate::state::{StateFile, Tracked};
use crate::ui;

/// Seed the identity from `id`, read the object and track it as `name`
fn import_into<C>(controller: &C, state: &mut StateFile, name: &str, id: &str) -> Result<()>
where
    C: Controller,
    C::Model: Tracked,
{
    let address = address(C::KIND, name);
    if C::Model::tracked(state).contains_key(name) {
        bail!("{address} is already managed; remove it from state before importing");
    }

    let seed = controller.import(id)?;
    let record = controller.read(&seed)?;
    log::info!("Imported {address} from id {id}");
    C::Model::tracked_mut(state).insert(name.to_string(), record);
    Ok(())
}

/// Import `id` into `state` for the given kind
pub fn import(
    controllers: &Controllers,
    state: &mut StateFile,
    kind: EntityKind,
    name: &str,
    id: &str,
) -> Result<()> {
    check_name(kind, name)?;
    match kind {
        EntityKind::AdType => import_into(&controllers.ad_type, state, name, id),
        EntityKind::Channel => import_into(&controllers.channel, state, name, id),
        EntityKind::Site => import_into(&controllers.site, state, name, id),
        EntityKind::ChannelSiteMap => {
            import_into(&controllers.channel_site_map, state, name, id)
        }
        EntityKind::CreativeTemplate => {
            import_into(&controllers.creative_template, state, name, id)
        }
        EntityKind::User => import_into(&controllers.user, state, name, id),
    }
}

pub fn run(ctx: &Context, kind: EntityKind, name: &str, id: &str) -> Result<()> {
    let desired = load_desired(ctx)?;
    let mut state = load_state(ctx)?;
    let controllers = connect(ctx, &desired)?;

    import(&controllers, &mut state, kind, name, id)?;
    state.save()?;

    ui::success(&format!("Imported {} (id {id})", address(kind, name)));
    if !desired.is_declared(kind, name) {
        ui::warn(&format!(
            "{} is not declared in {}; the next apply will destroy it",
            address(kind, name),
            ctx.config.display()
        ));
    }
    Ok(())
}
