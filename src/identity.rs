//! Identifiers used to attach existing remote objects to configuration.

use crate::error::ResourceError;
use crate::resource::EntityKind;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMPOSITE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+):([0-9]+)$").expect("COMPOSITE_ID is a valid pattern"));

/// Parse a decimal object id.
pub fn parse_id(kind: EntityKind, input: &str) -> Result<i64, ResourceError> {
    let invalid = |reason: String| ResourceError::InvalidImportId {
        kind,
        input: input.to_string(),
        reason,
    };

    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected decimal digits only".to_string()));
    }
    input
        .parse()
        .map_err(|e| invalid(format!("out of range ({e})")))
}

/// The identifier of a channel/site mapping, written `"<channel_id>:<site_id>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub channel_id: i64,
    pub site_id: i64,
}

impl CompositeId {
    pub fn new(channel_id: i64, site_id: i64) -> Self {
        Self {
            channel_id,
            site_id,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ResourceError> {
        let invalid = |reason: &str| ResourceError::InvalidImportId {
            kind: EntityKind::ChannelSiteMap,
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let captures = COMPOSITE_ID
            .captures(input)
            .ok_or_else(|| invalid("expected <channel_id>:<site_id>"))?;
        let channel_id = captures[1]
            .parse()
            .map_err(|_| invalid("channel id out of range"))?;
        let site_id = captures[2]
            .parse()
            .map_err(|_| invalid("site id out of range"))?;

        Ok(Self::new(channel_id, site_id))
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel_id, self.site_id)
    }
}
