//! Resource models and their schemas
//!
//! A resource model is a typed record (declared configuration, planned
//! record, or state) whose attributes are three-valued. The schema attached
//! to each model declares how every attribute may be set and whether
//! changing it can happen in place or forces a replacement.

use crate::types::Dynamic;
use std::fmt;

/// How an attribute may be supplied by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Must be set in configuration
    Required,
    /// May be set; null when omitted
    Optional,
    /// Assigned by the remote side; never configurable
    Computed,
    /// May be set; assigned by the remote side when omitted
    OptionalComputed,
}

impl Mode {
    pub fn is_configurable(self) -> bool {
        !matches!(self, Self::Computed)
    }

    pub fn is_computed(self) -> bool {
        matches!(self, Self::Computed | Self::OptionalComputed)
    }
}

/// Schema annotation for one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub mode: Mode,
    /// Changing this attribute destroys the object and creates a new one
    pub replace_on_change: bool,
}

impl Attribute {
    pub const fn required(name: &'static str) -> Self {
        Self::new(name, Mode::Required)
    }

    pub const fn optional(name: &'static str) -> Self {
        Self::new(name, Mode::Optional)
    }

    pub const fn computed(name: &'static str) -> Self {
        Self::new(name, Mode::Computed)
    }

    pub const fn optional_computed(name: &'static str) -> Self {
        Self::new(name, Mode::OptionalComputed)
    }

    const fn new(name: &'static str, mode: Mode) -> Self {
        Self {
            name,
            mode,
            replace_on_change: false,
        }
    }

    /// Mark this attribute as replace-on-change
    pub const fn requires_replace(mut self) -> Self {
        self.replace_on_change = true;
        self
    }
}

/// The attribute annotations of one resource type
#[derive(Debug)]
pub struct Schema {
    /// Resource type name, e.g. "channel"
    pub type_name: &'static str,
    pub attributes: &'static [Attribute],
}

impl Schema {
    pub const fn new(type_name: &'static str, attributes: &'static [Attribute]) -> Self {
        Self {
            type_name,
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of all replace-on-change attributes
    pub fn replace_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|a| a.replace_on_change)
            .map(|a| a.name)
    }
}

/// Errors raised when a model is accessed through its schema
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{type_name} has no attribute `{attribute}`")]
    UnknownAttribute {
        type_name: &'static str,
        attribute: String,
    },

    #[error("{type_name}.{attribute}: {source}")]
    Type {
        type_name: &'static str,
        attribute: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ModelError {
    pub fn unknown_attribute(type_name: &'static str, attribute: &str) -> Self {
        Self::UnknownAttribute {
            type_name,
            attribute: attribute.to_string(),
        }
    }
}

/// Core trait for declarative resource models
///
/// Every model exposes its attributes by name so the planner can resolve
/// computed values and compare records using only the schema annotations.
///
/// # Example
///
/// ```ignore
/// use declarative::{Attribute, Dynamic, Model, ModelError, Schema, Value};
///
/// static SCHEMA: Schema = Schema::new("thing", &[
///     Attribute::computed("id"),
///     Attribute::required("size").requires_replace(),
/// ]);
///
/// #[derive(Debug, Clone, Default)]
/// struct Thing { id: Value<i64>, size: Value<i64> }
///
/// impl Model for Thing {
///     fn schema() -> &'static Schema { &SCHEMA }
///
///     fn get(&self, name: &str) -> Option<Dynamic> {
///         match name {
///             "id" => Some(self.id.to_dynamic()),
///             "size" => Some(self.size.to_dynamic()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, name: &str, value: Dynamic) -> Result<(), ModelError> {
///         match name {
///             "id" => self.id = declarative::decode(&SCHEMA, name, value)?,
///             "size" => self.size = declarative::decode(&SCHEMA, name, value)?,
///             _ => return Err(ModelError::unknown_attribute(SCHEMA.type_name, name)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Model: Clone + fmt::Debug {
    /// The schema annotations for this model
    fn schema() -> &'static Schema;

    /// Read an attribute by name, or `None` if the schema has no such attribute
    fn get(&self, name: &str) -> Option<Dynamic>;

    /// Overwrite an attribute by name
    fn set(&mut self, name: &str, value: Dynamic) -> Result<(), ModelError>;
}

/// Convert a dynamic value back into a typed attribute for [`Model::set`]
pub fn decode<T: serde::de::DeserializeOwned>(
    schema: &Schema,
    attribute: &str,
    value: Dynamic,
) -> Result<crate::types::Value<T>, ModelError> {
    crate::types::Value::from_dynamic(value).map_err(|source| ModelError::Type {
        type_name: schema.type_name,
        attribute: attribute.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    static SCHEMA: Schema = Schema::new(
        "widget",
        &[
            Attribute::computed("id"),
            Attribute::required("width").requires_replace(),
            Attribute::optional("label"),
        ],
    );

    #[test]
    fn test_attribute_lookup() {
        let width = SCHEMA.attribute("width").unwrap();
        assert_eq!(width.mode, Mode::Required);
        assert!(width.replace_on_change);
        assert!(SCHEMA.attribute("missing").is_none());
    }

    #[test]
    fn test_replace_attributes() {
        let names: Vec<_> = SCHEMA.replace_attributes().collect();
        assert_eq!(names, vec!["width"]);
    }

    #[test]
    fn test_mode_flags() {
        assert!(!Mode::Computed.is_configurable());
        assert!(Mode::OptionalComputed.is_configurable());
        assert!(Mode::OptionalComputed.is_computed());
        assert!(!Mode::Optional.is_computed());
    }
}
