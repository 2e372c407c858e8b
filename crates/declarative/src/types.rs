//! Core types for declarative resource management

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A dynamically typed attribute value, used where the planner needs to
/// compare attributes without knowing the record's concrete type.
pub type Dynamic = Value<serde_json::Value>;

/// A three-valued attribute.
///
/// `Null` and `Unknown` are never interchangeable: `Null` is a concrete
/// answer ("this attribute is empty"), while `Unknown` only exists while
/// planning and means "resolved by the remote side during apply".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value<T> {
    /// Not resolved yet; only valid in planned records
    Unknown,
    /// Explicitly empty
    Null,
    /// A concrete value
    Known(T),
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

impl<T> Value<T> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The concrete value, if there is one
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Value<&T> {
        match self {
            Self::Unknown => Value::Unknown,
            Self::Null => Value::Null,
            Self::Known(value) => Value::Known(value),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Value<U> {
        match self {
            Self::Unknown => Value::Unknown,
            Self::Null => Value::Null,
            Self::Known(value) => Value::Known(f(value)),
        }
    }
}

impl<T: Serialize> Value<T> {
    /// Erase the concrete type for schema-driven comparison
    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            Self::Unknown => Value::Unknown,
            Self::Null => Value::Null,
            Self::Known(value) => match serde_json::to_value(value) {
                Ok(serde_json::Value::Null) | Err(_) => Value::Null,
                Ok(json) => Value::Known(json),
            },
        }
    }
}

impl<T: DeserializeOwned> Value<T> {
    /// Restore a concrete value previously produced by [`Value::to_dynamic`]
    pub fn from_dynamic(value: Dynamic) -> Result<Self, serde_json::Error> {
        Ok(match value {
            Value::Unknown => Self::Unknown,
            Value::Null => Self::Null,
            Value::Known(json) => Self::Known(serde_json::from_value(json)?),
        })
    }
}

// Records are persisted only once they are fully resolved, so an unknown
// value reaching a serializer is a planner bug rather than data.
impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => Err(S::Error::custom(
                "unknown attribute values cannot be serialized",
            )),
            Self::Null => serializer.serialize_none(),
            Self::Known(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Result of applying a single change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Object was created
    Created,
    /// Object was updated in place
    Updated,
    /// Object was destroyed and created again
    Replaced,
    /// Object was deleted
    Deleted,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Replaced | Self::Deleted
        )
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.deleted
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of changes processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Replaced => self.replaced += 1,
            ApplyResult::Deleted => self.deleted += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_unknown_are_distinct() {
        let null: Value<i64> = Value::Null;
        let unknown: Value<i64> = Value::Unknown;
        assert_ne!(null, unknown);
        assert!(null.is_null());
        assert!(unknown.is_unknown());
        assert_eq!(null.known(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(3)), Value::Known(3));
        assert_eq!(Value::<i32>::from(None), Value::Null);
    }

    #[test]
    fn test_serde_roundtrip_of_known_and_null() {
        let known = serde_json::to_string(&Value::Known("x".to_string())).unwrap();
        assert_eq!(known, "\"x\"");
        let null = serde_json::to_string(&Value::<String>::Null).unwrap();
        assert_eq!(null, "null");

        let parsed: Value<String> = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Value::Null);
        let parsed: Value<i64> = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, Value::Known(42));
    }

    #[test]
    fn test_unknown_refuses_to_serialize() {
        assert!(serde_json::to_string(&Value::<i64>::Unknown).is_err());
    }

    #[test]
    fn test_dynamic_roundtrip() {
        let value = Value::Known(vec![1_i64, 2, 3]);
        let dynamic = value.to_dynamic();
        assert_eq!(dynamic, Value::Known(serde_json::json!([1, 2, 3])));
        let back: Value<Vec<i64>> = Value::from_dynamic(dynamic).unwrap();
        assert_eq!(back, value);

        assert_eq!(Value::<String>::Unknown.to_dynamic(), Value::Unknown);
    }

    #[test]
    fn test_summary_counts_results() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::Replaced);
        summary.add_result(&ApplyResult::NoChange);
        summary.add_result(&ApplyResult::Failed {
            error: "boom".into(),
        });
        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());
    }
}
