//! Desired state and provider settings
//!
//! The desired state is one TOML document with a table per object kind,
//! keyed by local name:
//!
//! ```toml
//! [provider]
//! api_key = "..."
//!
//! [ad_type.leaderboard]
//! width = 728
//! height = 90
//!
//! [channel.home]
//! title = "Home"
//! ad_types = [1, 2]
//! ```

use crate::resource::{AdType, Channel, ChannelSiteMap, CreativeTemplate, EntityKind, Site, User};
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default desired-state file
pub const DEFAULT_CONFIG_FILE: &str = "kevel.toml";

/// Default state file name, placed next to the desired-state file
pub const DEFAULT_STATE_FILE: &str = "kevel.state.json";

static LOCAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("LOCAL_NAME is a valid pattern")
});

// ============================================================================
// Provider
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Resolved connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Resolve provider settings
///
/// `cli_*` already carry the environment fallback (clap `env`), so the
/// order is flag, then environment, then the `[provider]` table.
pub fn resolve(
    cli_base_url: Option<&str>,
    cli_api_key: Option<&str>,
    section: &ProviderSection,
) -> Result<ProviderSettings> {
    let api_key = cli_api_key
        .or(section.api_key.as_deref())
        .filter(|key| !key.trim().is_empty())
        .context("No API key configured: pass --api-key, set KEVEL_API_KEY, or add api_key to [provider]")?;

    let api_base_url = cli_base_url
        .or(section.api_base_url.as_deref())
        .unwrap_or(kevelkit::DEFAULT_API_BASE);

    log::debug!("Using API base {api_base_url}");
    Ok(ProviderSettings {
        api_base_url: api_base_url.to_string(),
        api_key: api_key.to_string(),
    })
}

// ============================================================================
// Desired state
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Desired {
    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub ad_type: BTreeMap<String, AdType>,

    #[serde(default)]
    pub channel: BTreeMap<String, Channel>,

    #[serde(default)]
    pub site: BTreeMap<String, Site>,

    #[serde(default)]
    pub channel_site_map: BTreeMap<String, ChannelSiteMap>,

    #[serde(default)]
    pub creative_template: BTreeMap<String, CreativeTemplate>,

    #[serde(default)]
    pub user: BTreeMap<String, User>,
}

impl Desired {
    /// Load and validate the desired-state file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let desired = Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(desired)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let desired: Self = toml::from_str(content)?;
        desired.validate()?;
        Ok(desired)
    }

    fn validate(&self) -> Result<()> {
        for kind in EntityKind::ALL {
            for name in self.names(kind) {
                check_name(kind, name)?;
            }
        }
        Ok(())
    }

    /// Local names declared for `kind`, sorted
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

    pub fn is_declared(&self, kind: EntityKind, name: &str) -> bool {
        self.names(kind).contains(&name)
    }
}

/// Local names start with a letter or `_` and contain no dots or spaces
pub fn check_name(kind: EntityKind, name: &str) -> Result<()> {
    if !LOCAL_NAME.is_match(name) {
        bail!("Invalid name `{kind}.{name}`: use letters, digits, `_` and `-`");
    }
    Ok(())
}

// ============================================================================
// Paths
// ============================================================================

/// Expand `~` and environment variables in a path argument
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// The state file to use: the explicit one, or the default next to `config`
pub fn state_path(config: &Path, explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(path) => expand_path(path),
        None => config
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_STATE_FILE),
    }
}
