//! Ad types: named width × height formats.
//!
//! The API has no get-by-id and no update endpoint. Reads scan the ad type
//! listing, and an in-place update re-posts the create body with `Id` set.
//! Only `name` can change without replacement, and only when it was
//! already resolved, since every other attribute is replace-on-change.

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::parse_id;
use declarative::{Attribute, Schema, Value};
use kevelkit::{Backend, Body};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static SCHEMA: Schema = Schema::new(
    "ad_type",
    &[
        Attribute::computed("id"),
        Attribute::optional_computed("name").requires_replace(),
        Attribute::required("width").requires_replace(),
        Attribute::required("height").requires_replace(),
    ],
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdType {
    pub id: Value<i64>,
    /// Derived by the API from the size when omitted
    pub name: Value<String>,
    pub width: Value<i64>,
    pub height: Value<i64>,
}

impl_model!(AdType, SCHEMA, [id, name, width, height]);

impl AdType {
    pub fn create_body(&self) -> Result<Body, CodecError> {
        let mut body = Body::new();
        codec::put(&mut body, "Name", &self.name);
        codec::put_int(&mut body, "Width", "width", &self.width)?;
        codec::put_int(&mut body, "Height", "height", &self.height)?;
        Ok(body)
    }

    pub fn update_body(&self) -> Result<Body, CodecError> {
        let mut body = Body::new();
        body.insert(
            "Id".to_string(),
            codec::required_int("id", &self.id)?.into(),
        );
        body.extend(self.create_body()?);
        Ok(body)
    }

    pub fn project(remote: &kevelkit::AdType) -> Self {
        Self {
            id: Value::Known(i64::from(remote.id)),
            name: codec::from_wire(remote.name.clone()),
            width: codec::widen(remote.width),
            height: codec::widen(remote.height),
        }
    }
}

#[derive(Clone)]
pub struct AdTypeController {
    backend: Arc<dyn Backend>,
}

impl AdTypeController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl Controller for AdTypeController {
    type Model = AdType;

    const KIND: EntityKind = EntityKind::AdType;

    fn identity(record: &AdType) -> Identity {
        Identity::from_id(record.id.known())
    }

    fn create(&self, plan: &AdType) -> Result<AdType, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .create_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let created = remote(Self::KIND, &id, self.backend.create_ad_type(&body))?;
        log::info!("Created ad type {}", created.id);
        Ok(AdType::project(&created))
    }

    fn read(&self, state: &AdType) -> Result<AdType, ResourceError> {
        let id = Self::identity(state);
        let wire_id = codec::required_int("id", &state.id)
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let found = remote(Self::KIND, &id, self.backend.find_ad_type(wire_id))?;
        Ok(AdType::project(&found))
    }

    fn update(&self, plan: &AdType) -> Result<AdType, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .update_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let updated = remote(Self::KIND, &id, self.backend.create_ad_type(&body))?;
        Ok(AdType::project(&updated))
    }

    fn delete(&self, state: &AdType) -> Result<(), ResourceError> {
        let id = Self::identity(state);
        let wire_id = codec::required_int("id", &state.id)
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        self.backend
            .delete_ad_type(wire_id)
            .map_err(|e| ResourceError::api(Self::KIND, id, e))
    }

    fn import(&self, id: &str) -> Result<AdType, ResourceError> {
        Ok(AdType {
            id: Value::Known(parse_id(Self::KIND, id)?),
            ..AdType::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, Model, plan_action, plan_record};
    use kevelkit::MockBackend;
    use serde_json::json;

    fn setup() -> (MockBackend, AdTypeController) {
        let mock = MockBackend::new();
        let controller = AdTypeController::new(Arc::new(mock.clone()));
        (mock, controller)
    }

    fn config(width: i64, height: i64) -> AdType {
        AdType {
            width: Value::Known(width),
            height: Value::Known(height),
            ..AdType::default()
        }
    }

    #[test]
    fn test_create_body_omits_unknown_name_and_sends_null() {
        let mut plan = plan_record(&config(640, 480), None).unwrap();
        assert!(plan.name.is_unknown());
        assert_eq!(
            serde_json::Value::Object(plan.create_body().unwrap()),
            json!({"Width": 640, "Height": 480})
        );

        plan.name = Value::Null;
        assert_eq!(plan.create_body().unwrap()["Name"], json!(null));
    }

    #[test]
    fn test_create_body_rejects_overflow() {
        let err = config(1 << 33, 1).create_body().unwrap_err();
        assert!(matches!(err, CodecError::Overflow { attribute: "width", .. }));
    }

    #[test]
    fn test_create_assigns_id_and_computes_name() {
        let (_, controller) = setup();
        let plan = plan_record(&config(640, 480), None).unwrap();
        let state = controller.create(&plan).unwrap();

        assert!(state.id.is_known());
        assert_eq!(state.name, Value::Known("640x480".to_string()));
        assert_eq!(state.width, plan.width);
        assert_eq!(state.height, plan.height);
    }

    #[test]
    fn test_resizing_forces_replacement() {
        let (_, controller) = setup();
        let prior = controller
            .create(&plan_record(&config(640, 480), None).unwrap())
            .unwrap();

        let planned = plan_record(&config(640, 640), Some(&prior)).unwrap();
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Replace {
                attributes: vec!["height"]
            }
        );
    }

    #[test]
    fn test_omitted_name_keeps_prior_value() {
        let (_, controller) = setup();
        let prior = controller
            .create(&plan_record(&config(300, 250), None).unwrap())
            .unwrap();
        let planned = plan_record(&config(300, 250), Some(&prior)).unwrap();
        assert_eq!(planned, prior);
        assert_eq!(plan_action(Some(&prior), Some(&planned)), Action::NoOp);
    }

    #[test]
    fn test_update_reposts_with_id() {
        let (mock, controller) = setup();
        let prior = controller
            .create(&plan_record(&config(300, 250), None).unwrap())
            .unwrap();
        let body = prior.update_body().unwrap();
        assert_eq!(body.keys().next().map(String::as_str), Some("Id"));

        let updated = controller.update(&prior).unwrap();
        assert_eq!(updated.id, prior.id);
        assert_eq!(mock.calls().last().map(String::as_str), Some("create_ad_type"));
    }

    #[test]
    fn test_read_scans_and_misses_are_not_found() {
        let (mock, controller) = setup();
        mock.insert_ad_type(kevelkit::AdType {
            id: 42,
            name: Some("Leaderboard".into()),
            width: Some(728),
            height: Some(90),
        });

        let seeded = controller.import("42").unwrap();
        assert_eq!(seeded.id, Value::Known(42));
        assert!(seeded.name.is_null() && seeded.width.is_null() && seeded.height.is_null());

        let state = controller.read(&seeded).unwrap();
        assert_eq!(state.name, Value::Known("Leaderboard".to_string()));
        assert_eq!(state.width, Value::Known(728));

        let missing = controller.import("43").unwrap();
        assert!(controller.read(&missing).unwrap_err().is_not_found());
    }

    #[test]
    fn test_import_rejects_malformed_id() {
        let (_, controller) = setup();
        assert!(matches!(
            controller.import("forty-two"),
            Err(ResourceError::InvalidImportId { .. })
        ));
    }

    #[test]
    fn test_create_failure_surfaces_status() {
        let (mock, controller) = setup();
        mock.fail_next("create_ad_type", 500);
        let err = controller
            .create(&plan_record(&config(1, 1), None).unwrap())
            .unwrap_err();
        assert!(matches!(err, ResourceError::Api { .. }));
        assert!(err.to_string().starts_with("ad_type (new)"));
    }

    #[test]
    fn test_empty_create_response_is_an_error() {
        let (mock, controller) = setup();
        mock.respond_empty_next("create_ad_type");
        let err = controller
            .create(&plan_record(&config(1, 1), None).unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_is_hard() {
        let (mock, controller) = setup();
        let state = controller
            .create(&plan_record(&config(1, 1), None).unwrap())
            .unwrap();
        controller.delete(&state).unwrap();
        let id = i32::try_from(*state.id.known().unwrap()).unwrap();
        assert!(mock.ad_type(id).is_none());
    }

    #[test]
    fn test_missing_wire_size_projects_to_null() {
        let wire: kevelkit::AdType = serde_json::from_value(serde_json::json!({"Id": 3})).unwrap();
        let projected = AdType::project(&wire);
        assert_eq!(projected.id, Value::Known(3));
        assert!(projected.name.is_null());
        assert!(projected.width.is_null() && projected.height.is_null());
    }

    #[test]
    fn test_schema_is_reachable_through_model() {
        assert_eq!(AdType::schema().replace_attributes().count(), 3);
    }
}
