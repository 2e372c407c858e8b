//! Channel/site priority mappings
//!
//! A mapping has no id of its own; it is addressed by its two foreign keys
//! and its `id` attribute is the composite `"<channel_id>:<site_id>"`.

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::CompositeId;
use declarative::{Attribute, Schema, Value};
use kevelkit::{Backend, ChannelSiteMapBody};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Priority sent when none is configured or known.
pub const DEFAULT_PRIORITY: i32 = 0;

static SCHEMA: Schema = Schema::new(
    "channel_site_map",
    &[
        Attribute::computed("id"),
        Attribute::required("channel_id").requires_replace(),
        Attribute::required("site_id").requires_replace(),
        Attribute::optional_computed("priority"),
    ],
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelSiteMap {
    pub id: Value<String>,
    pub channel_id: Value<i64>,
    pub site_id: Value<i64>,
    pub priority: Value<i64>,
}

impl_model!(ChannelSiteMap, SCHEMA, [id, channel_id, site_id, priority]);

impl ChannelSiteMap {
    /// Create and update share one payload; priority is always sent.
    pub fn body(&self) -> Result<ChannelSiteMapBody, CodecError> {
        let priority = match &self.priority {
            Value::Known(priority) => codec::narrow("priority", *priority)?,
            Value::Null | Value::Unknown => DEFAULT_PRIORITY,
        };

        Ok(ChannelSiteMapBody {
            channel_id: codec::required_int("channel_id", &self.channel_id)?,
            site_id: codec::required_int("site_id", &self.site_id)?,
            priority,
        })
    }

    pub fn project(remote: &kevelkit::ChannelSiteMap) -> Self {
        let key = CompositeId::new(i64::from(remote.channel_id), i64::from(remote.site_id));
        Self {
            id: Value::Known(key.to_string()),
            channel_id: Value::Known(key.channel_id),
            site_id: Value::Known(key.site_id),
            priority: codec::widen(remote.priority),
        }
    }

    fn key(&self) -> Result<(i32, i32), CodecError> {
        Ok((
            codec::required_int("channel_id", &self.channel_id)?,
            codec::required_int("site_id", &self.site_id)?,
        ))
    }
}

#[derive(Clone)]
pub struct ChannelSiteMapController {
    backend: Arc<dyn Backend>,
}

impl ChannelSiteMapController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn encoding(record: &ChannelSiteMap) -> impl FnOnce(CodecError) -> ResourceError {
        let id = Self::identity(record);
        move |e| ResourceError::encoding(EntityKind::ChannelSiteMap, id, e)
    }
}

impl Controller for ChannelSiteMapController {
    type Model = ChannelSiteMap;

    const KIND: EntityKind = EntityKind::ChannelSiteMap;

    fn identity(record: &ChannelSiteMap) -> Identity {
        if let Value::Known(id) = &record.id {
            return Identity::Known(id.clone());
        }
        match (&record.channel_id, &record.site_id) {
            (Value::Known(channel_id), Value::Known(site_id)) => {
                Identity::Known(CompositeId::new(*channel_id, *site_id).to_string())
            }
            _ => Identity::New,
        }
    }

    fn create(&self, plan: &ChannelSiteMap) -> Result<ChannelSiteMap, ResourceError> {
        let body = plan.body().map_err(Self::encoding(plan))?;
        let created = remote(
            Self::KIND,
            &Self::identity(plan),
            self.backend.create_channel_site_map(&body),
        )?;
        log::info!(
            "Mapped site {} into channel {} at priority {}",
            created.site_id,
            created.channel_id,
            created.priority.unwrap_or(DEFAULT_PRIORITY)
        );
        Ok(ChannelSiteMap::project(&created))
    }

    fn read(&self, state: &ChannelSiteMap) -> Result<ChannelSiteMap, ResourceError> {
        let (channel_id, site_id) = state.key().map_err(Self::encoding(state))?;
        let found = remote(
            Self::KIND,
            &Self::identity(state),
            self.backend.get_channel_site_map(channel_id, site_id),
        )?;
        Ok(ChannelSiteMap::project(&found))
    }

    fn update(&self, plan: &ChannelSiteMap) -> Result<ChannelSiteMap, ResourceError> {
        let body = plan.body().map_err(Self::encoding(plan))?;
        let updated = remote(
            Self::KIND,
            &Self::identity(plan),
            self.backend.update_channel_site_map(&body),
        )?;
        Ok(ChannelSiteMap::project(&updated))
    }

    fn delete(&self, state: &ChannelSiteMap) -> Result<(), ResourceError> {
        let (channel_id, site_id) = state.key().map_err(Self::encoding(state))?;
        self.backend
            .delete_channel_site_map(channel_id, site_id)
            .map_err(|e| ResourceError::api(Self::KIND, Self::identity(state), e))
    }

    fn import(&self, id: &str) -> Result<ChannelSiteMap, ResourceError> {
        let key = CompositeId::parse(id)?;
        Ok(ChannelSiteMap {
            id: Value::Known(key.to_string()),
            channel_id: Value::Known(key.channel_id),
            site_id: Value::Known(key.site_id),
            priority: Value::Null,
        })
    }
}
