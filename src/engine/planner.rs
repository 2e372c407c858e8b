//! Builds the ordered list of changes from desired config × state
//!
//! Creates and updates run in dependency order (ad types and sites before
//! the objects that reference them); deletions run afterwards in reverse
//! order.

use crate::config::Desired;
use crate::resource::{
    AdTypeController, ChannelController, ChannelSiteMapController, Controller,
    CreativeTemplateController, EntityKind, SiteController, UserController,
};
use crate::state::{StateFile, Tracked};
use anyhow::{Context as _, Result, bail};
use declarative::{
    Action, ApplyContext, ApplyResult, BoxedChange, Change, plan_action, plan_record,
};
use kevelkit::Backend;
use std::sync::Arc;

/// Restricts a plan to one kind, or to one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: EntityKind,
    pub name: Option<String>,
}

impl Target {
    /// Parse `kind` or `kind.name`
    pub fn parse(target: &str) -> Result<Self> {
        let (kind, name) = match target.split_once('.') {
            Some((kind, name)) => (kind, Some(name.to_string())),
            None => (target, None),
        };
        let kind = kind.parse::<EntityKind>().map_err(anyhow::Error::msg)?;
        if name.as_deref() == Some("") {
            bail!("Invalid target `{target}`: missing name after `.`");
        }
        Ok(Self { kind, name })
    }

    pub fn matches(&self, kind: EntityKind, name: &str) -> bool {
        self.kind == kind && self.name.as_deref().is_none_or(|n| n == name)
    }
}

/// `kind.name`
pub fn address(kind: EntityKind, name: &str) -> String {
    format!("{kind}.{name}")
}

/// One planned change for a record of controller `C`
pub struct PlannedChange<C: Controller> {
    controller: C,
    name: String,
    address: String,
    action: Action,
    /// Declared configuration, absent for deletions
    config: Option<C::Model>,
    /// Planned record, absent for deletions
    planned: Option<C::Model>,
    /// Last known state, absent for creations
    prior: Option<C::Model>,
}

impl<C> PlannedChange<C>
where
    C: Controller,
    C::Model: Tracked,
{
    fn declared(&self) -> Result<&C::Model> {
        self.planned
            .as_ref()
            .with_context(|| format!("{} has no planned record", self.address))
    }

    fn tracked(&self) -> Result<&C::Model> {
        self.prior
            .as_ref()
            .with_context(|| format!("{} has no prior state", self.address))
    }

    fn record(&self, state: &mut StateFile, record: C::Model) {
        C::Model::tracked_mut(state).insert(self.name.clone(), record);
    }

    fn forget(&self, state: &mut StateFile) {
        C::Model::tracked_mut(state).remove(&self.name);
    }

    fn replace(&self, state: &mut StateFile) -> Result<()> {
        let prior = self.tracked()?;
        self.controller.delete(prior)?;
        self.forget(state);
        state.save()?;
        log::info!("Destroyed {} for replacement", self.address);

        let config = self
            .config
            .as_ref()
            .with_context(|| format!("{} has no configuration", self.address))?;
        let fresh = plan_record(config, None)
            .with_context(|| format!("Failed to plan {}", self.address))?;
        let created = self.controller.create(&fresh)?;
        self.record(state, created);
        Ok(())
    }
}

impl<C> Change<StateFile> for PlannedChange<C>
where
    C: Controller,
    C::Model: Tracked,
{
    fn address(&self) -> &str {
        &self.address
    }

    fn resource_type(&self) -> &'static str {
        C::KIND.name()
    }

    fn action(&self) -> &Action {
        &self.action
    }

    fn apply(&mut self, ctx: &ApplyContext, state: &mut StateFile) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".into(),
            });
        }

        let result = match &self.action {
            Action::NoOp => return Ok(ApplyResult::NoChange),
            Action::Create => {
                let created = self.controller.create(self.declared()?)?;
                self.record(state, created);
                ApplyResult::Created
            }
            Action::Update { .. } => {
                let updated = self.controller.update(self.declared()?)?;
                self.record(state, updated);
                ApplyResult::Updated
            }
            Action::Replace { .. } => {
                self.replace(state)?;
                ApplyResult::Replaced
            }
            Action::Delete => {
                self.controller.delete(self.tracked()?)?;
                self.forget(state);
                ApplyResult::Deleted
            }
        };

        state.save()?;
        if ctx.verbose {
            log::info!("{}: {:?}", self.address, result);
        }
        Ok(result)
    }
}

struct KindPlan {
    upserts: Vec<BoxedChange<StateFile>>,
    deletes: Vec<BoxedChange<StateFile>>,
}

fn plan_kind<C>(
    controller: &C,
    desired: &Desired,
    state: &StateFile,
    target: Option<&Target>,
) -> Result<KindPlan>
where
    C: Controller + Clone + 'static,
    C::Model: Tracked,
{
    let kind = C::KIND;
    let declared = C::Model::declared(desired);
    let tracked = C::Model::tracked(state);
    let selected = |name: &str| target.is_none_or(|t| t.matches(kind, name));

    let mut upserts: Vec<BoxedChange<StateFile>> = Vec::new();
    for (name, config) in declared.iter().filter(|(name, _)| selected(name.as_str())) {
        let address = address(kind, name);
        let prior = tracked.get(name);
        let planned = plan_record(config, prior)
            .with_context(|| format!("Failed to plan {address}"))?;
        let action = plan_action(prior, Some(&planned));
        log::debug!("{address}: {action:?}");

        upserts.push(Box::new(PlannedChange {
            controller: controller.clone(),
            name: name.clone(),
            address,
            action,
            config: Some(config.clone()),
            planned: Some(planned),
            prior: prior.cloned(),
        }));
    }

    let mut deletes: Vec<BoxedChange<StateFile>> = Vec::new();
    for (name, prior) in tracked
        .iter()
        .filter(|(name, _)| selected(name.as_str()) && !declared.contains_key(name.as_str()))
    {
        deletes.push(Box::new(PlannedChange {
            controller: controller.clone(),
            name: name.clone(),
            address: address(kind, name),
            action: Action::Delete,
            config: None,
            planned: None,
            prior: Some(prior.clone()),
        }));
    }

    Ok(KindPlan { upserts, deletes })
}

/// Every controller, sharing one API handle
#[derive(Clone)]
pub struct Controllers {
    pub ad_type: AdTypeController,
    pub channel: ChannelController,
    pub site: SiteController,
    pub channel_site_map: ChannelSiteMapController,
    pub creative_template: CreativeTemplateController,
    pub user: UserController,
}

impl Controllers {
    pub fn new(backend: &Arc<dyn Backend>) -> Self {
        Self {
            ad_type: AdTypeController::new(Arc::clone(backend)),
            channel: ChannelController::new(Arc::clone(backend)),
            site: SiteController::new(Arc::clone(backend)),
            channel_site_map: ChannelSiteMapController::new(Arc::clone(backend)),
            creative_template: CreativeTemplateController::new(Arc::clone(backend)),
            user: UserController::new(Arc::clone(backend)),
        }
    }

    /// Changes that converge `state` to `desired`
    ///
    /// Pass an empty `desired` to plan the destruction of everything tracked.
    pub fn plan(
        &self,
        desired: &Desired,
        state: &StateFile,
        target: Option<&Target>,
    ) -> Result<Vec<BoxedChange<StateFile>>> {
        let plans = [
            plan_kind(&self.ad_type, desired, state, target)?,
            plan_kind(&self.channel, desired, state, target)?,
            plan_kind(&self.site, desired, state, target)?,
            plan_kind(&self.channel_site_map, desired, state, target)?,
            plan_kind(&self.creative_template, desired, state, target)?,
            plan_kind(&self.user, desired, state, target)?,
        ];

        let mut changes = Vec::new();
        let mut deletes = Vec::new();
        for plan in plans {
            changes.extend(plan.upserts);
            deletes.push(plan.deletes);
        }
        changes.extend(deletes.into_iter().rev().flatten());
        Ok(changes)
    }
}
