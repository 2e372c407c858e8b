//! `refresh` - re-read every tracked object

use anyhow::{Context as _, Result};

use super::{connect, load_desired, load_state};
use crate::Context;
use crate::engine::{Controllers, Target, address};
use crate::resource::Controller;
use crate::state::{StateFile, Tracked};
use crate::ui;

/// What a refresh did to the tracked records
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub unchanged: usize,
    pub drifted: usize,
    pub removed: usize,
}

impl RefreshSummary {
    fn merge(&mut self, other: Self) {
        self.unchanged += other.unchanged;
        self.drifted += other.drifted;
        self.removed += other.removed;
    }
}

/// Read every tracked record of `C`'s kind and store the result
///
/// Objects that no longer exist remotely are dropped from state; any other
/// read error aborts the refresh.
fn refresh_kind<C>(
    controller: &C,
    state: &mut StateFile,
    target: Option<&Target>,
) -> Result<RefreshSummary>
where
    C: Controller,
    C::Model: Tracked,
{
    let kind = C::KIND;
    let names: Vec<String> = C::Model::tracked(state)
        .keys()
        .filter(|name| target.is_none_or(|t| t.matches(kind, name)))
        .cloned()
        .collect();

    let mut summary = RefreshSummary::default();
    for name in names {
        let address = address(kind, &name);
        let tracked = C::Model::tracked_mut(state);
        let Some(prior) = tracked.get(&name) else {
            continue;
        };

        match controller.read(prior) {
            Ok(current) => {
                if &current == prior {
                    summary.unchanged += 1;
                } else {
                    log::info!("{address} changed outside of this tool");
                    summary.drifted += 1;
                }
                tracked.insert(name, current);
            }
            Err(e) if e.is_not_found() => {
                ui::warn(&format!("{address} no longer exists; removing it from state"));
                tracked.remove(&name);
                summary.removed += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to refresh {address}")),
        }
    }
    Ok(summary)
}

/// Refresh every kind, in creation order
pub fn refresh_all(
    controllers: &Controllers,
    state: &mut StateFile,
    target: Option<&Target>,
) -> Result<RefreshSummary> {
    let mut summary = RefreshSummary::default();
    summary.merge(refresh_kind(&controllers.ad_type, state, target)?);
    summary.merge(refresh_kind(&controllers.channel, state, target)?);
    summary.merge(refresh_kind(&controllers.site, state, target)?);
    summary.merge(refresh_kind(&controllers.channel_site_map, state, target)?);
    summary.merge(refresh_kind(&controllers.creative_template, state, target)?);
    summary.merge(refresh_kind(&controllers.user, state, target)?);
    Ok(summary)
}

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let target = target.map(Target::parse).transpose()?;
    let desired = load_desired(ctx)?;
    let mut state = load_state(ctx)?;
    let controllers = connect(ctx, &desired)?;

    let summary = refresh_all(&controllers, &mut state, target.as_ref())?;
    state.save()?;

    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed state: {} unchanged, {} drifted, {} removed",
            summary.unchanged, summary.drifted, summary.removed
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Desired;
    use declarative::{ExecuteOptions, Value, execute_simple};
    use kevelkit::{Backend, MockBackend};
    use std::sync::Arc;

    fn applied(mock: &MockBackend) -> (Controllers, StateFile) {
        let backend: Arc<dyn Backend> = Arc::new(mock.clone());
        let controllers = Controllers::new(&backend);
        let desired = Desired::parse(
            "[site.blog]\ntitle = \"Blog\"\nurl = \"https://blog.example\"\n\n\
             [channel.home]\ntitle = \"Home\"\nad_types = []\n",
        )
        .unwrap();
        let mut state = StateFile::default();
        let changes = controllers.plan(&desired, &state, None).unwrap();
        execute_simple(changes, &mut state, &ExecuteOptions::default()).unwrap();
        (controllers, state)
    }

    #[test]
    fn test_refresh_detects_drift_and_removal() {
        let mock = MockBackend::new();
        let (controllers, mut state) = applied(&mock);

        let site_id = i32::try_from(*state.site["blog"].id.known().unwrap()).unwrap();
        let mut site = mock.site(site_id).unwrap();
        site.title = Some("Renamed".into());
        mock.insert_site(site);

        let channel_id = i32::try_from(*state.channel["home"].id.known().unwrap()).unwrap();
        mock.delete_channel(channel_id).unwrap();

        let summary = refresh_all(&controllers, &mut state, None).unwrap();
        assert_eq!(
            summary,
            RefreshSummary {
                unchanged: 0,
                drifted: 1,
                removed: 1
            }
        );
        assert_eq!(state.site["blog"].title, Value::Known("Renamed".to_string()));
        assert!(state.channel.is_empty());
    }

    #[test]
    fn test_refresh_aborts_on_api_error() {
        let mock = MockBackend::new();
        let (controllers, mut state) = applied(&mock);
        mock.fail_next("get_site", 503);

        let err = refresh_all(&controllers, &mut state, None).unwrap_err();
        assert!(format!("{err:#}").contains("site.blog"));
        assert!(state.site.contains_key("blog"));
    }

    #[test]
    fn test_refresh_respects_target() {
        let mock = MockBackend::new();
        let (controllers, mut state) = applied(&mock);
        let target = Target::parse("site").unwrap();

        let summary = refresh_all(&controllers, &mut state, Some(&target)).unwrap();
        assert_eq!(summary.unchanged, 1);
        assert!(!mock.calls().iter().any(|c| c == "get_channel"));
    }
}
