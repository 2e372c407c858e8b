//! Diff computation for resources

use crate::resource::Model;
use crate::types::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// What has to happen to one resource to converge it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Already converged
    NoOp,
    /// Declared but not in state
    Create,
    /// Changed attributes can all be updated in place
    Update { attributes: Vec<&'static str> },
    /// At least one changed attribute is replace-on-change
    Replace { attributes: Vec<&'static str> },
    /// In state but no longer declared
    Delete,
}

impl Action {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Short symbol used when rendering plans
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::NoOp => " ",
            Self::Create => "+",
            Self::Update { .. } => "~",
            Self::Replace { .. } => "-/+",
            Self::Delete => "-",
        }
    }
}

/// Attributes whose planned value differs from the prior state
///
/// Unknown planned values are not differences: they are resolved by the
/// remote side and cannot be compared until after apply.
pub fn changed_attributes<M: Model>(prior: &M, planned: &M) -> Vec<&'static str> {
    M::schema()
        .attributes
        .iter()
        .filter(|attribute| {
            let after = planned.get(attribute.name);
            if matches!(after, Some(Value::Unknown)) {
                return false;
            }
            prior.get(attribute.name) != after
        })
        .map(|attribute| attribute.name)
        .collect()
}

/// Decide the action for a resource from its prior state and planned record
///
/// Replacement is driven purely by the `replace_on_change` annotations of
/// the model's schema.
pub fn plan_action<M: Model>(prior: Option<&M>, planned: Option<&M>) -> Action {
    match (prior, planned) {
        (None, None) => Action::NoOp,
        (None, Some(_)) => Action::Create,
        (Some(_), None) => Action::Delete,
        (Some(prior), Some(planned)) => {
            let attributes = changed_attributes(prior, planned);
            if attributes.is_empty() {
                return Action::NoOp;
            }

            let schema = M::schema();
            let forces_replace = attributes.iter().any(|name| {
                schema
                    .attribute(name)
                    .is_some_and(|attribute| attribute.replace_on_change)
            });

            if forces_replace {
                Action::Replace { attributes }
            } else {
                Action::Update { attributes }
            }
        }
    }
}

/// A planned change for one resource address
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDiff {
    /// Local address of the resource, e.g. "channel.homepage"
    pub address: String,
    /// Type of the resource
    pub resource_type: String,
    /// Planned action
    pub action: Action,
}

impl ResourceDiff {
    pub fn is_addition(&self) -> bool {
        matches!(self.action, Action::Create)
    }

    pub fn is_removal(&self) -> bool {
        matches!(self.action, Action::Delete)
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self.action, Action::Replace { .. })
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub additions: usize,
    pub updates: usize,
    pub replacements: usize,
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::NoOp => {}
                Action::Create => summary.additions += 1,
                Action::Update { .. } => summary.updates += 1,
                Action::Replace { .. } => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.updates + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> BTreeMap<&str, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<&str, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.as_str())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{decode, Attribute, ModelError, Schema};
    use crate::types::Dynamic;

    static SCHEMA: Schema = Schema::new(
        "panel",
        &[
            Attribute::computed("id"),
            Attribute::required("width").requires_replace(),
            Attribute::required("title"),
        ],
    );

    #[derive(Debug, Clone, Default)]
    struct Panel {
        id: Value<i64>,
        width: Value<i64>,
        title: Value<String>,
    }

    impl Model for Panel {
        fn schema() -> &'static Schema {
            &SCHEMA
        }

        fn get(&self, name: &str) -> Option<Dynamic> {
            Some(match name {
                "id" => self.id.to_dynamic(),
                "width" => self.width.to_dynamic(),
                "title" => self.title.to_dynamic(),
                _ => return None,
            })
        }

        fn set(&mut self, name: &str, value: Dynamic) -> Result<(), ModelError> {
            match name {
                "id" => self.id = decode(&SCHEMA, name, value)?,
                "width" => self.width = decode(&SCHEMA, name, value)?,
                "title" => self.title = decode(&SCHEMA, name, value)?,
                _ => return Err(ModelError::unknown_attribute(SCHEMA.type_name, name)),
            }
            Ok(())
        }
    }

    fn panel(id: Value<i64>, width: i64, title: &str) -> Panel {
        Panel {
            id,
            width: Value::Known(width),
            title: Value::Known(title.to_string()),
        }
    }

    #[test]
    fn test_create_and_delete() {
        let p = panel(Value::Unknown, 1, "a");
        assert_eq!(plan_action(None, Some(&p)), Action::Create);
        assert_eq!(plan_action(Some(&p), None), Action::Delete);
        assert_eq!(plan_action::<Panel>(None, None), Action::NoOp);
    }

    #[test]
    fn test_unchanged_is_noop() {
        let prior = panel(Value::Known(1), 10, "a");
        assert_eq!(plan_action(Some(&prior), Some(&prior.clone())), Action::NoOp);
    }

    #[test]
    fn test_mutable_change_updates_in_place() {
        let prior = panel(Value::Known(1), 10, "a");
        let planned = panel(Value::Known(1), 10, "b");
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Update {
                attributes: vec!["title"]
            }
        );
    }

    #[test]
    fn test_immutable_change_replaces() {
        let prior = panel(Value::Known(1), 10, "a");
        let planned = panel(Value::Known(1), 20, "b");
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Replace {
                attributes: vec!["width", "title"]
            }
        );
    }

    #[test]
    fn test_unknown_planned_values_are_not_changes() {
        let prior = panel(Value::Known(1), 10, "a");
        let planned = panel(Value::Unknown, 10, "a");
        assert!(changed_attributes(&prior, &planned).is_empty());
    }

    #[test]
    fn test_summary_and_grouping() {
        let diffs = vec![
            ResourceDiff {
                address: "panel.a".into(),
                resource_type: "panel".into(),
                action: Action::Create,
            },
            ResourceDiff {
                address: "panel.b".into(),
                resource_type: "panel".into(),
                action: Action::Replace {
                    attributes: vec!["width"],
                },
            },
            ResourceDiff {
                address: "door.c".into(),
                resource_type: "door".into(),
                action: Action::Delete,
            },
        ];

        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.replacements, 1);
        assert_eq!(summary.removals, 1);
        assert!(summary.has_changes());

        let groups = group_by_type(&diffs);
        assert_eq!(groups["panel"].len(), 2);
        assert_eq!(groups["door"].len(), 1);
    }
}
