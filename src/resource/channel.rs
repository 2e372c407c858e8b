//! Channels

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::parse_id;
use declarative::{Attribute, Schema, Value};
use kevelkit::{Backend, ChannelBody, ENGINE_CPM};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

static SCHEMA: Schema = Schema::new(
    "channel",
    &[
        Attribute::computed("id"),
        Attribute::required("title"),
        Attribute::required("ad_types"),
        Attribute::computed("engine"),
    ],
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Channel {
    pub id: Value<i64>,
    pub title: Value<String>,
    /// Order is irrelevant; the set keeps them sorted and unique
    pub ad_types: Value<BTreeSet<i64>>,
    pub engine: Value<i64>,
}

impl_model!(Channel, SCHEMA, [id, title, ad_types, engine]);

impl Channel {
    pub fn create_body(&self) -> Result<ChannelBody, CodecError> {
        let ad_types = match &self.ad_types {
            Value::Unknown => None,
            Value::Null => Some(None),
            Value::Known(ids) => Some(Some(
                ids.iter()
                    .map(|&id| codec::narrow("ad_types", id))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        };

        Ok(ChannelBody {
            id: None,
            title: codec::required("title", &self.title)?,
            ad_types,
            engine: ENGINE_CPM,
        })
    }

    pub fn update_body(&self) -> Result<ChannelBody, CodecError> {
        Ok(ChannelBody {
            id: Some(codec::required_int("id", &self.id)?),
            ..self.create_body()?
        })
    }

    pub fn project(remote: &kevelkit::Channel) -> Self {
        Self {
            id: Value::Known(i64::from(remote.id)),
            title: codec::from_wire(remote.title.clone()),
            ad_types: codec::from_wire(
                remote
                    .ad_types
                    .as_ref()
                    .map(|ids| ids.iter().copied().map(i64::from).collect()),
            ),
            engine: Value::Known(i64::from(remote.engine)),
        }
    }
}

#[derive(Clone)]
pub struct ChannelController {
    backend: Arc<dyn Backend>,
}

impl ChannelController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn wire_id(record: &Channel) -> Result<i32, ResourceError> {
        codec::required_int("id", &record.id)
            .map_err(|e| ResourceError::encoding(EntityKind::Channel, Self::identity(record), e))
    }
}

impl Controller for ChannelController {
    type Model = Channel;

    const KIND: EntityKind = EntityKind::Channel;

    fn identity(record: &Channel) -> Identity {
        Identity::from_id(record.id.known())
    }

    fn create(&self, plan: &Channel) -> Result<Channel, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .create_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let created = remote(Self::KIND, &id, self.backend.create_channel(&body))?;
        log::info!("Created channel {}", created.id);
        Ok(Channel::project(&created))
    }

    fn read(&self, state: &Channel) -> Result<Channel, ResourceError> {
        let wire_id = Self::wire_id(state)?;
        let found = remote(
            Self::KIND,
            &Self::identity(state),
            self.backend.get_channel(wire_id),
        )?;
        Ok(Channel::project(&found))
    }

    fn update(&self, plan: &Channel) -> Result<Channel, ResourceError> {
        let id = Self::identity(plan);
        let wire_id = Self::wire_id(plan)?;
        let body = plan
            .update_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let updated = remote(Self::KIND, &id, self.backend.update_channel(wire_id, &body))?;
        Ok(Channel::project(&updated))
    }

    fn delete(&self, state: &Channel) -> Result<(), ResourceError> {
        let wire_id = Self::wire_id(state)?;
        self.backend
            .delete_channel(wire_id)
            .map_err(|e| ResourceError::api(Self::KIND, Self::identity(state), e))
    }

    fn import(&self, id: &str) -> Result<Channel, ResourceError> {
        Ok(Channel {
            id: Value::Known(parse_id(Self::KIND, id)?),
            ..Channel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, plan_action, plan_record};
    use kevelkit::MockBackend;
    use serde_json::json;

    fn config(title: &str, ad_types: &[i64]) -> Channel {
        Channel {
            title: Value::Known(title.to_string()),
            ad_types: Value::Known(ad_types.iter().copied().collect()),
            ..Channel::default()
        }
    }

    #[test]
    fn test_empty_and_absent_ad_types_differ_on_the_wire() {
        let empty = config("Home", &[]).create_body().unwrap();
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!({"Title": "Home", "AdTypes": [], "Engine": 0})
        );

        let mut unresolved = config("Home", &[]);
        unresolved.ad_types = Value::Unknown;
        let body = serde_json::to_value(unresolved.create_body().unwrap()).unwrap();
        assert!(body.get("AdTypes").is_none());

        let mut cleared = config("Home", &[]);
        cleared.ad_types = Value::Null;
        let body = serde_json::to_value(cleared.create_body().unwrap()).unwrap();
        assert_eq!(body["AdTypes"], json!(null));
    }

    #[test]
    fn test_unknown_title_fails_fast() {
        let mut plan = config("x", &[]);
        plan.title = Value::Unknown;
        assert_eq!(plan.create_body(), Err(CodecError::Unresolved("title")));
    }

    #[test]
    fn test_ad_type_order_is_irrelevant() {
        let a = config("Home", &[3, 1, 2]);
        let b = config("Home", &[2, 3, 1, 1]);
        assert_eq!(a, b);
        let body = a.create_body().unwrap();
        assert_eq!(body.ad_types, Some(Some(vec![1, 2, 3])));
    }

    #[test]
    fn test_round_trip_through_echoing_backend() {
        let mock = MockBackend::new();
        let controller = ChannelController::new(Arc::new(mock.clone()));
        let declared = config("Home", &[4, 5]);

        let state = controller
            .create(&plan_record(&declared, None).unwrap())
            .unwrap();
        assert!(state.id.is_known());
        assert_eq!(state.title, declared.title);
        assert_eq!(state.ad_types, declared.ad_types);
        assert_eq!(state.engine, Value::Known(0));

        assert_eq!(controller.read(&state).unwrap(), state);
    }

    #[test]
    fn test_title_change_updates_in_place() {
        let mock = MockBackend::new();
        let controller = ChannelController::new(Arc::new(mock.clone()));
        let prior = controller
            .create(&plan_record(&config("Home", &[]), None).unwrap())
            .unwrap();

        let planned = plan_record(&config("Front page", &[]), Some(&prior)).unwrap();
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Update {
                attributes: vec!["title"]
            }
        );

        let updated = controller.update(&planned).unwrap();
        assert_eq!(updated.id, prior.id);
        assert_eq!(updated.title, Value::Known("Front page".to_string()));

        let wire_id = i32::try_from(*prior.id.known().unwrap()).unwrap();
        assert_eq!(mock.channel(wire_id).unwrap().title.as_deref(), Some("Front page"));
    }

    #[test]
    fn test_update_body_repeats_every_field() {
        let mut plan = config("Home", &[7]);
        plan.id = Value::Known(12);
        assert_eq!(
            serde_json::to_value(plan.update_body().unwrap()).unwrap(),
            json!({"Id": 12, "Title": "Home", "AdTypes": [7], "Engine": 0})
        );
    }

    #[test]
    fn test_delete_then_read_is_not_found() {
        let mock = MockBackend::new();
        let controller = ChannelController::new(Arc::new(mock));
        let state = controller
            .create(&plan_record(&config("Home", &[]), None).unwrap())
            .unwrap();
        controller.delete(&state).unwrap();

        let err = controller.read(&state).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("channel "));
    }

    #[test]
    fn test_overflowing_ad_type_id_is_rejected() {
        let plan = config("Home", &[i64::from(i32::MAX) + 1]);
        assert!(matches!(
            plan.create_body(),
            Err(CodecError::Overflow {
                attribute: "ad_types",
                ..
            })
        ));
    }
}
