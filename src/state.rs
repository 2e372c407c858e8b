//! Persisted state records
//!
//! The state file is the last-known reflection of every managed object,
//! keyed by kind and local name. It is JSON so records keep the exact
//! shape of their models, and it is rewritten after every applied change.

use crate::config::Desired;
use crate::resource::{AdType, Channel, ChannelSiteMap, CreativeTemplate, EntityKind, Site, User};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::Model;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ad_type: BTreeMap<String, AdType>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub channel: BTreeMap<String, Channel>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub site: BTreeMap<String, Site>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub channel_site_map: BTreeMap<String, ChannelSiteMap>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub creative_template: BTreeMap<String, CreativeTemplate>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user: BTreeMap<String, User>,

    /// Last time the state was written
    pub last_updated: DateTime<Utc>,

    /// Where `save` writes; `None` keeps the state in memory only
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            ad_type: BTreeMap::new(),
            channel: BTreeMap::new(),
            site: BTreeMap::new(),
            channel_site_map: BTreeMap::new(),
            creative_template: BTreeMap::new(),
            user: BTreeMap::new(),
            last_updated: Utc::now(),
            path: None,
        }
    }
}

impl StateFile {
    /// Load state from `path`, or start empty if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let mut state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
        state.path = Some(path.to_path_buf());

        log::debug!("Loaded {} records from {}", state.len(), path.display());
        Ok(state)
    }

    /// Write the state next to its final location, then rename it into place
    pub fn save(&mut self) -> Result<()> {
        self.last_updated = Utc::now();
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        let staging = staging_path(path);
        fs::write(&staging, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", staging.display()))?;
        fs::rename(&staging, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of tracked records across all kinds
    pub fn len(&self) -> usize {
        self.ad_type.len()
            + self.channel.len()
            + self.site.len()
            + self.channel_site_map.len()
            + self.creative_template.len()
            + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Local names tracked for `kind`, sorted
    pub fn names(&self, kind: EntityKind) -> Vec<&str> {
        fn keys<T>(map: &BTreeMap<String, T>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }

        match kind {
            EntityKind::AdType => keys(&self.ad_type),
            EntityKind::Channel => keys(&self.channel),
            EntityKind::Site => keys(&self.site),
            EntityKind::ChannelSiteMap => keys(&self.channel_site_map),
            EntityKind::CreativeTemplate => keys(&self.creative_template),
            EntityKind::User => keys(&self.user),
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ============================================================================
// Per-kind access
// ============================================================================

/// Models that are declared in the configuration and tracked in state
pub trait Tracked: Model + Serialize + DeserializeOwned + Sized {
    const KIND: EntityKind;

    fn declared(desired: &Desired) -> &BTreeMap<String, Self>;

    fn tracked(state: &StateFile) -> &BTreeMap<String, Self>;

    fn tracked_mut(state: &mut StateFile) -> &mut BTreeMap<String, Self>;
}

macro_rules! impl_tracked {
    ($($model:ty => $kind:ident, $field:ident;)+) => {
        $(
            impl Tracked for $model {
                const KIND: EntityKind = EntityKind::$kind;

                fn declared(desired: &Desired) -> &BTreeMap<String, Self> {
                    &desired.$field
                }

                fn tracked(state: &StateFile) -> &BTreeMap<String, Self> {
                    &state.$field
                }

                fn tracked_mut(state: &mut StateFile) -> &mut BTreeMap<String, Self> {
                    &mut state.$field
                }
            }
        )+
    };
}

impl_tracked! {
    AdType => AdType, ad_type;
    Channel => Channel, channel;
    Site => Site, site;
    ChannelSiteMap => ChannelSiteMap, channel_site_map;
    CreativeTemplate => CreativeTemplate, creative_template;
    User => User, user;
}
