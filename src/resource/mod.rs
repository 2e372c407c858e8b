//! Entity controllers
//!
//! Each entity module holds:
//! - the model (declared configuration, planned record and state record
//!   share one type) and its schema annotations
//! - request body builders
//! - the state projector, mapping an API record back into a model
//! - the controller, driving create/read/update/delete/import
//!
//! Update-versus-replace is never decided here: the planner reads the
//! `replace_on_change` annotations and only calls `update` when no such
//! attribute changed.

// Declared before the entity modules so they see it in textual scope.
/// Implement [`Model`] for a record whose fields are all `Value<_>` and
/// named like its schema attributes.
macro_rules! impl_model {
    ($model:ty, $schema:ident, [$($field:ident),+ $(,)?]) => {
        impl declarative::Model for $model {
            fn schema() -> &'static declarative::Schema {
                &$schema
            }

            fn get(&self, name: &str) -> Option<declarative::Dynamic> {
                match name {
                    $(stringify!($field) => Some(self.$field.to_dynamic()),)+
                    _ => None,
                }
            }

            fn set(
                &mut self,
                name: &str,
                value: declarative::Dynamic,
            ) -> Result<(), declarative::ModelError> {
                match name {
                    $(stringify!($field) => {
                        self.$field = declarative::decode(&$schema, name, value)?;
                    })+
                    _ => {
                        return Err(declarative::ModelError::unknown_attribute(
                            $schema.type_name,
                            name,
                        ));
                    }
                }
                Ok(())
            }
        }
    };
}

pub mod ad_type;
pub mod channel;
pub mod channel_site_map;
pub mod creative_template;
pub mod site;
pub mod user;

use crate::error::{Identity, ResourceError};
use declarative::Model;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

pub use ad_type::{AdType, AdTypeController};
pub use channel::{Channel, ChannelController};
pub use channel_site_map::{ChannelSiteMap, ChannelSiteMapController};
pub use creative_template::{CreativeTemplate, CreativeTemplateController};
pub use site::{Site, SiteController};
pub use user::{User, UserController};

/// Kinds of managed objects
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum EntityKind {
    AdType,
    Channel,
    Site,
    ChannelSiteMap,
    CreativeTemplate,
    User,
}

impl EntityKind {
    /// All kinds, in creation order.
    pub const ALL: [Self; 6] = [
        Self::AdType,
        Self::Channel,
        Self::Site,
        Self::ChannelSiteMap,
        Self::CreativeTemplate,
        Self::User,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AdType => "ad_type",
            Self::Channel => "channel",
            Self::Site => "site",
            Self::ChannelSiteMap => "channel_site_map",
            Self::CreativeTemplate => "creative_template",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown resource kind: {s}"))
    }
}

/// Create/read/update/delete/import for one entity kind
///
/// Controllers hold only the shared API handle; every call is independent
/// and issues its remote requests synchronously.
pub trait Controller {
    type Model: Model + Default + PartialEq + Serialize + DeserializeOwned + 'static;

    const KIND: EntityKind;

    /// Identifier of a record, for error messages and plan output.
    fn identity(record: &Self::Model) -> Identity;

    /// Create the remote object and return the resolved state record.
    fn create(&self, plan: &Self::Model) -> Result<Self::Model, ResourceError>;

    /// Fetch the remote object for a state record.
    fn read(&self, state: &Self::Model) -> Result<Self::Model, ResourceError>;

    /// Update the remote object in place.
    fn update(&self, plan: &Self::Model) -> Result<Self::Model, ResourceError>;

    /// Remove the remote object, or flag it as deleted.
    fn delete(&self, state: &Self::Model) -> Result<(), ResourceError>;

    /// Seed a state record holding only the identity parsed from `id`.
    ///
    /// Callers must [`read`](Controller::read) the seed before using it.
    fn import(&self, id: &str) -> Result<Self::Model, ResourceError>;
}

/// Unwrap an API answer; an empty answer means the object is gone.
pub(crate) fn remote<T>(
    kind: EntityKind,
    id: &Identity,
    result: kevelkit::Result<Option<T>>,
) -> Result<T, ResourceError> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(ResourceError::NotFound {
            kind,
            id: id.clone(),
        }),
        Err(source) => Err(ResourceError::api(kind, id.clone(), source)),
    }
}
