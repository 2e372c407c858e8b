//! Creative templates
//!
//! The update endpoint only patches scalar properties, so `fields` and
//! `contents` are replace-on-change. Templates are archived rather than
//! deleted, and an archived template reads as gone.

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::parse_id;
use declarative::{Attribute, Schema, Value};
use kevelkit::{
    Backend, TemplateBody, TemplateContent, TemplateField, TemplateUpdate, UpdateOperation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static SCHEMA: Schema = Schema::new(
    "creative_template",
    &[
        Attribute::computed("id"),
        Attribute::required("name"),
        Attribute::optional("description"),
        Attribute::optional_computed("fields").requires_replace(),
        Attribute::optional_computed("contents").requires_replace(),
    ],
);

// ============================================================================
// Fields and contents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Array,
    ExternalFile,
    File,
    Object,
    String,
}

impl FieldType {
    const ALL: [Self; 5] = [
        Self::Array,
        Self::ExternalFile,
        Self::File,
        Self::Object,
        Self::String,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "Array",
            Self::ExternalFile => "ExternalFile",
            Self::File => "File",
            Self::Object => "Object",
            Self::String => "String",
        }
    }

    fn parse(value: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| CodecError::UnrecognizedValue {
                attribute: "fields.type",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "CSS")]
    Css,
    #[serde(rename = "HTML")]
    Html,
    JavaScript,
    JavaScriptExternal,
    Raw,
}

impl ContentType {
    const ALL: [Self; 5] = [
        Self::Css,
        Self::Html,
        Self::JavaScript,
        Self::JavaScriptExternal,
        Self::Raw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::Html => "HTML",
            Self::JavaScript => "JavaScript",
            Self::JavaScriptExternal => "JavaScriptExternal",
            Self::Raw => "Raw",
        }
    }

    fn parse(value: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| CodecError::UnrecognizedValue {
                attribute: "contents.type",
                value: value.to_string(),
            })
    }
}

/// Default value of a template field: a string, a list of strings, or
/// nothing. Never both.
///
/// Configured as `default = { string = "..." }` or
/// `default = { array = ["...", "..."] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DefaultSlots", into = "DefaultSlots")]
pub enum FieldDefault {
    #[default]
    None,
    String(String),
    Array(Vec<String>),
}

impl FieldDefault {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn to_wire(&self) -> Option<serde_json::Value> {
        match self {
            Self::None => None,
            Self::String(value) => Some(serde_json::Value::from(value.clone())),
            Self::Array(values) => Some(serde_json::Value::from(values.clone())),
        }
    }

    fn from_wire(value: Option<&serde_json::Value>) -> Result<Self, CodecError> {
        let unrecognized =
            |value: &serde_json::Value| CodecError::UnrecognizedDefault(value.to_string());
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::None),
            Some(serde_json::Value::String(value)) => Ok(Self::String(value.clone())),
            Some(array @ serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::Array)
                .ok_or_else(|| unrecognized(array)),
            Some(other) => Err(unrecognized(other)),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefaultSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    array: Option<Vec<String>>,
}

impl TryFrom<DefaultSlots> for FieldDefault {
    type Error = String;

    fn try_from(slots: DefaultSlots) -> Result<Self, Self::Error> {
        match (slots.string, slots.array) {
            (None, None) => Ok(Self::None),
            (Some(value), None) => Ok(Self::String(value)),
            (None, Some(values)) => Ok(Self::Array(values)),
            (Some(_), Some(_)) => Err("a field default is a string or an array, not both".into()),
        }
    }
}

impl From<FieldDefault> for DefaultSlots {
    fn from(default: FieldDefault) -> Self {
        match default {
            FieldDefault::None => Self::default(),
            FieldDefault::String(value) => Self {
                string: Some(value),
                array: None,
            },
            FieldDefault::Array(values) => Self {
                string: None,
                array: Some(values),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variable: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub ad_query: bool,
    #[serde(default, skip_serializing_if = "FieldDefault::is_none")]
    pub default: FieldDefault,
}

impl Field {
    fn to_wire(&self) -> TemplateField {
        TemplateField {
            field_type: self.field_type.as_str().to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            variable: self.variable.clone(),
            required: self.required,
            hidden: self.hidden,
            ad_query: self.ad_query,
            default: self.default.to_wire(),
        }
    }

    fn from_wire(remote: &TemplateField) -> Result<Self, CodecError> {
        Ok(Self {
            field_type: FieldType::parse(&remote.field_type)?,
            name: remote.name.clone(),
            description: remote.description.clone(),
            variable: remote.variable.clone(),
            required: remote.required,
            hidden: remote.hidden,
            ad_query: remote.ad_query,
            default: FieldDefault::from_wire(remote.default.as_ref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Content {
    fn to_wire(&self) -> TemplateContent {
        TemplateContent {
            content_type: self.content_type.as_str().to_string(),
            body: self.body.clone(),
        }
    }

    fn from_wire(remote: &TemplateContent) -> Result<Self, CodecError> {
        Ok(Self {
            content_type: ContentType::parse(&remote.content_type)?,
            body: remote.body.clone(),
        })
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreativeTemplate {
    pub id: Value<i64>,
    pub name: Value<String>,
    pub description: Value<String>,
    pub fields: Value<Vec<Field>>,
    pub contents: Value<Vec<Content>>,
}

impl_model!(CreativeTemplate, SCHEMA, [id, name, description, fields, contents]);

impl CreativeTemplate {
    pub fn create_body(&self) -> Result<TemplateBody, CodecError> {
        Ok(TemplateBody {
            name: codec::required("name", &self.name)?,
            description: codec::nullable(&self.description),
            fields: codec::nullable(
                &self
                    .fields
                    .as_ref()
                    .map(|fields| fields.iter().map(Field::to_wire).collect::<Vec<_>>()),
            ),
            contents: codec::nullable(
                &self
                    .contents
                    .as_ref()
                    .map(|contents| contents.iter().map(Content::to_wire).collect::<Vec<_>>()),
            ),
        })
    }

    pub fn update_body(&self) -> Result<TemplateUpdate, CodecError> {
        let mut updates = vec![UpdateOperation::set(
            "Name",
            codec::required("name", &self.name)?,
        )];
        if let Some(description) = codec::nullable(&self.description) {
            updates.push(UpdateOperation::set("Description", description));
        }
        Ok(TemplateUpdate { updates })
    }

    pub fn delete_body() -> TemplateUpdate {
        TemplateUpdate {
            updates: vec![UpdateOperation::set("IsArchived", true)],
        }
    }

    pub fn project(remote: &kevelkit::CreativeTemplate) -> Result<Self, CodecError> {
        Ok(Self {
            id: Value::Known(i64::from(remote.id)),
            name: Value::Known(remote.name.clone()),
            description: codec::from_wire(remote.description.clone()),
            fields: Value::Known(
                remote
                    .fields
                    .iter()
                    .map(Field::from_wire)
                    .collect::<Result<_, _>>()?,
            ),
            contents: Value::Known(
                remote
                    .contents
                    .iter()
                    .map(Content::from_wire)
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

#[derive(Clone)]
pub struct CreativeTemplateController {
    backend: Arc<dyn Backend>,
}

impl CreativeTemplateController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn wire_id(record: &CreativeTemplate) -> Result<i32, ResourceError> {
        codec::required_int("id", &record.id).map_err(|e| {
            ResourceError::encoding(EntityKind::CreativeTemplate, Self::identity(record), e)
        })
    }

    fn patch(
        &self,
        record: &CreativeTemplate,
        update: &TemplateUpdate,
    ) -> Result<kevelkit::CreativeTemplate, ResourceError> {
        let wire_id = Self::wire_id(record)?;
        remote(
            Self::KIND,
            &Self::identity(record),
            self.backend.update_creative_template(wire_id, update),
        )
    }

    fn project(
        id: &Identity,
        remote: &kevelkit::CreativeTemplate,
    ) -> Result<CreativeTemplate, ResourceError> {
        CreativeTemplate::project(remote)
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))
    }
}

impl Controller for CreativeTemplateController {
    type Model = CreativeTemplate;

    const KIND: EntityKind = EntityKind::CreativeTemplate;

    fn identity(record: &CreativeTemplate) -> Identity {
        Identity::from_id(record.id.known())
    }

    fn create(&self, plan: &CreativeTemplate) -> Result<CreativeTemplate, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .create_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let created = remote(Self::KIND, &id, self.backend.create_creative_template(&body))?;
        log::info!("Created creative template {} ({})", created.id, created.name);
        Self::project(&Identity::Known(created.id.to_string()), &created)
    }

    fn read(&self, state: &CreativeTemplate) -> Result<CreativeTemplate, ResourceError> {
        let id = Self::identity(state);
        let found = remote(
            Self::KIND,
            &id,
            self.backend.get_creative_template(Self::wire_id(state)?),
        )?;
        if found.is_archived {
            log::debug!("Creative template {} is archived", found.id);
            return Err(ResourceError::NotFound { kind: Self::KIND, id });
        }
        Self::project(&id, &found)
    }

    fn update(&self, plan: &CreativeTemplate) -> Result<CreativeTemplate, ResourceError> {
        let update = plan
            .update_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, Self::identity(plan), e))?;
        let updated = self.patch(plan, &update)?;
        Self::project(&Self::identity(plan), &updated)
    }

    fn delete(&self, state: &CreativeTemplate) -> Result<(), ResourceError> {
        self.patch(state, &CreativeTemplate::delete_body())?;
        Ok(())
    }

    fn import(&self, id: &str) -> Result<CreativeTemplate, ResourceError> {
        Ok(CreativeTemplate {
            id: Value::Known(parse_id(Self::KIND, id)?),
            ..CreativeTemplate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, plan_action, plan_record};
    use kevelkit::MockBackend;
    use serde_json::json;

    fn headline() -> Field {
        Field {
            field_type: FieldType::String,
            name: "Headline".into(),
            description: None,
            variable: "ctHeadline".into(),
            required: true,
            hidden: false,
            ad_query: false,
            default: FieldDefault::String("Hello".into()),
        }
    }

    fn config() -> CreativeTemplate {
        CreativeTemplate {
            name: Value::Known("Banner".into()),
            description: Value::Known("Simple banner".into()),
            fields: Value::Known(vec![headline()]),
            contents: Value::Known(vec![Content {
                content_type: ContentType::Html,
                body: Some("<h1>{{ctHeadline}}</h1>".into()),
            }]),
            ..CreativeTemplate::default()
        }
    }

    fn setup() -> (MockBackend, CreativeTemplateController) {
        let mock = MockBackend::new();
        let controller = CreativeTemplateController::new(Arc::new(mock.clone()));
        (mock, controller)
    }

    #[test]
    fn test_default_is_a_tagged_variant_in_config() {
        let field: Field = toml::from_str(
            r#"
            type = "Array"
            name = "Tags"
            variable = "ctTags"
            default = { array = ["a", "b"] }
            "#,
        )
        .unwrap();
        assert_eq!(field.default, FieldDefault::Array(vec!["a".into(), "b".into()]));
        assert!(!field.required);

        let both = toml::from_str::<Field>(
            r#"
            type = "String"
            name = "X"
            variable = "ctX"
            default = { string = "a", array = ["b"] }
            "#,
        );
        assert!(both.is_err());
    }

    #[test]
    fn test_projector_routes_default_by_shape() {
        assert_eq!(FieldDefault::from_wire(None), Ok(FieldDefault::None));
        assert_eq!(
            FieldDefault::from_wire(Some(&json!("x"))),
            Ok(FieldDefault::String("x".into()))
        );
        assert_eq!(
            FieldDefault::from_wire(Some(&json!(["x", "y"]))),
            Ok(FieldDefault::Array(vec!["x".into(), "y".into()]))
        );
        assert_eq!(
            FieldDefault::from_wire(Some(&json!(42))),
            Err(CodecError::UnrecognizedDefault("42".into()))
        );
        assert!(FieldDefault::from_wire(Some(&json!(["x", 1]))).is_err());
    }

    #[test]
    fn test_create_body_shape() {
        let body = serde_json::to_value(config().create_body().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "Name": "Banner",
                "Description": "Simple banner",
                "Fields": [{
                    "Type": "String",
                    "Name": "Headline",
                    "Variable": "ctHeadline",
                    "Required": true,
                    "Hidden": false,
                    "AdQuery": false,
                    "Default": "Hello"
                }],
                "Contents": [{"Type": "HTML", "Body": "<h1>{{ctHeadline}}</h1>"}]
            })
        );
    }

    #[test]
    fn test_unresolved_lists_are_omitted_from_create() {
        let plan = plan_record(
            &CreativeTemplate {
                name: Value::Known("Bare".into()),
                ..CreativeTemplate::default()
            },
            None,
        )
        .unwrap();
        assert!(plan.fields.is_unknown() && plan.contents.is_unknown());

        let body = serde_json::to_value(plan.create_body().unwrap()).unwrap();
        assert_eq!(body, json!({"Name": "Bare", "Description": null}));
        assert!(body.get("Fields").is_none());
        assert!(body.get("Contents").is_none());
    }

    #[test]
    fn test_null_and_empty_lists_are_sent() {
        let nulled = CreativeTemplate {
            name: Value::Known("Bare".into()),
            fields: Value::Null,
            contents: Value::Known(vec![]),
            ..CreativeTemplate::default()
        };
        let body = serde_json::to_value(nulled.create_body().unwrap()).unwrap();
        assert_eq!(body["Fields"], serde_json::Value::Null);
        assert_eq!(body["Contents"], json!([]));
    }

    #[test]
    fn test_unset_lists_read_back_empty() {
        let (mock, controller) = setup();
        let plan = plan_record(
            &CreativeTemplate {
                name: Value::Known("Bare".into()),
                ..CreativeTemplate::default()
            },
            None,
        )
        .unwrap();
        let state = controller.create(&plan).unwrap();
        assert_eq!(state.fields, Value::Known(vec![]));
        assert_eq!(state.contents, Value::Known(vec![]));
        assert!(mock.creative_template(1).unwrap().fields.is_empty());
    }

    #[test]
    fn test_round_trip_through_echoing_backend() {
        let (_, controller) = setup();
        let declared = config();
        let state = controller
            .create(&plan_record(&declared, None).unwrap())
            .unwrap();
        assert_eq!(state.name, declared.name);
        assert_eq!(state.description, declared.description);
        assert_eq!(state.fields, declared.fields);
        assert_eq!(state.contents, declared.contents);
        assert_eq!(controller.read(&state).unwrap(), state);
    }

    #[test]
    fn test_rename_patches_and_field_change_replaces() {
        let (mock, controller) = setup();
        let prior = controller
            .create(&plan_record(&config(), None).unwrap())
            .unwrap();

        let mut renamed = config();
        renamed.name = Value::Known("Hero".into());
        renamed.description = Value::Null;
        let planned = plan_record(&renamed, Some(&prior)).unwrap();
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Update {
                attributes: vec!["name", "description"]
            }
        );
        assert_eq!(
            serde_json::to_value(planned.update_body().unwrap()).unwrap(),
            json!({"Updates": [
                {"Path": ["Name"], "Value": "Hero"},
                {"Path": ["Description"], "Value": null}
            ]})
        );
        let updated = controller.update(&planned).unwrap();
        assert_eq!(updated, planned);
        assert_eq!(mock.creative_template(1).unwrap().name, "Hero");

        let mut refielded = renamed;
        refielded.fields = Value::Known(vec![]);
        let planned = plan_record(&refielded, Some(&updated)).unwrap();
        assert_eq!(
            plan_action(Some(&updated), Some(&planned)),
            Action::Replace {
                attributes: vec!["fields"]
            }
        );
    }

    #[test]
    fn test_delete_archives() {
        let (mock, controller) = setup();
        let state = controller
            .create(&plan_record(&config(), None).unwrap())
            .unwrap();
        controller.delete(&state).unwrap();

        assert!(mock.creative_template(1).unwrap().is_archived);
        assert!(controller.read(&state).unwrap_err().is_not_found());
    }

    #[test]
    fn test_unrecognized_remote_type_is_an_encoding_error() {
        let wire = kevelkit::CreativeTemplate {
            id: 5,
            name: "Odd".into(),
            contents: vec![TemplateContent {
                content_type: "Flash".into(),
                body: None,
            }],
            ..kevelkit::CreativeTemplate::default()
        };
        assert_eq!(
            CreativeTemplate::project(&wire),
            Err(CodecError::UnrecognizedValue {
                attribute: "contents.type",
                value: "Flash".into()
            })
        );
    }
}
