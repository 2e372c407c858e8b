//! Users
//!
//! The API has no way to remove a login, so delete always fails.

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::parse_id;
use declarative::{Attribute, Schema, Value};
use kevelkit::{Backend, UserBody};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static SCHEMA: Schema = Schema::new(
    "user",
    &[
        Attribute::computed("id"),
        Attribute::required("email").requires_replace(),
        Attribute::optional_computed("name"),
        Attribute::optional_computed("access_level"),
        Attribute::optional_computed("can_access_studio"),
    ],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Admin,
    Manager,
    Editor,
    Reader,
}

impl From<AccessLevel> for kevelkit::AccessLevel {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Admin => Self::Admin,
            AccessLevel::Manager => Self::Manager,
            AccessLevel::Editor => Self::Editor,
            AccessLevel::Reader => Self::Reader,
        }
    }
}

impl From<kevelkit::AccessLevel> for AccessLevel {
    fn from(level: kevelkit::AccessLevel) -> Self {
        match level {
            kevelkit::AccessLevel::Admin => Self::Admin,
            kevelkit::AccessLevel::Manager => Self::Manager,
            kevelkit::AccessLevel::Editor => Self::Editor,
            kevelkit::AccessLevel::Reader => Self::Reader,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct User {
    pub id: Value<i64>,
    pub email: Value<String>,
    pub name: Value<String>,
    pub access_level: Value<AccessLevel>,
    pub can_access_studio: Value<bool>,
}

impl_model!(User, SCHEMA, [id, email, name, access_level, can_access_studio]);

impl User {
    pub fn create_body(&self) -> Result<UserBody, CodecError> {
        Ok(UserBody {
            id: None,
            email: codec::required("email", &self.email)?,
            name: codec::nullable(&self.name),
            access_level: codec::nullable(&self.access_level.clone().map(kevelkit::AccessLevel::from)),
            can_access_studio: codec::nullable(&self.can_access_studio),
        })
    }

    pub fn update_body(&self) -> Result<UserBody, CodecError> {
        Ok(UserBody {
            id: Some(codec::required_int("id", &self.id)?),
            ..self.create_body()?
        })
    }

    pub fn project(remote: &kevelkit::User) -> Self {
        Self {
            id: Value::Known(i64::from(remote.id)),
            email: Value::Known(remote.email.clone()),
            name: codec::from_wire(remote.name.clone()),
            access_level: codec::from_wire(remote.access_level.map(AccessLevel::from)),
            can_access_studio: codec::from_wire(remote.can_access_studio),
        }
    }
}

#[derive(Clone)]
pub struct UserController {
    backend: Arc<dyn Backend>,
}

impl UserController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl Controller for UserController {
    type Model = User;

    const KIND: EntityKind = EntityKind::User;

    fn identity(record: &User) -> Identity {
        Identity::from_id(record.id.known())
    }

    fn create(&self, plan: &User) -> Result<User, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .create_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let created = remote(Self::KIND, &id, self.backend.create_user(&body))?;
        log::info!("Created user {} ({})", created.id, created.email);
        Ok(User::project(&created))
    }

    fn read(&self, state: &User) -> Result<User, ResourceError> {
        let id = Self::identity(state);
        let wire_id = codec::required_int("id", &state.id)
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let found = remote(Self::KIND, &id, self.backend.get_user(wire_id))?;
        Ok(User::project(&found))
    }

    fn update(&self, plan: &User) -> Result<User, ResourceError> {
        let id = Self::identity(plan);
        let encoding = |e| ResourceError::encoding(Self::KIND, id.clone(), e);
        let wire_id = codec::required_int("id", &plan.id).map_err(encoding)?;
        let body = plan.update_body().map_err(encoding)?;
        let updated = remote(Self::KIND, &id, self.backend.update_user(wire_id, &body))?;
        Ok(User::project(&updated))
    }

    fn delete(&self, state: &User) -> Result<(), ResourceError> {
        Err(ResourceError::Unsupported {
            kind: Self::KIND,
            id: Self::identity(state),
            operation: "delete",
        })
    }

    fn import(&self, id: &str) -> Result<User, ResourceError> {
        Ok(User {
            id: Value::Known(parse_id(Self::KIND, id)?),
            ..User::default()
        })
    }
}
