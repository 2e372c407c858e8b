//! Planner - resolves declared configuration into planned records
//!
//! The planner only uses the schema annotations of a model. For each
//! attribute:
//!
//! - computed attributes keep their prior state value, or become unknown
//!   when there is no prior state (they are assigned during apply)
//! - optional+computed attributes take the configured value when one is
//!   set, otherwise behave like computed attributes
//! - required attributes must be set
//! - optional attributes are taken verbatim from configuration

use crate::resource::{Mode, Model, ModelError};
use crate::types::Value;

/// Errors raised while planning a record
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{type_name}.{attribute} is required")]
    MissingRequired {
        type_name: &'static str,
        attribute: &'static str,
    },

    #[error("{type_name}.{attribute} is computed and cannot be configured")]
    NotConfigurable {
        type_name: &'static str,
        attribute: &'static str,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Build the planned record for `config`, given the prior state if any
///
/// Pass `prior = None` when planning a create, including the create half of
/// a replacement, so that computed attributes are re-assigned remotely.
pub fn plan_record<M: Model>(config: &M, prior: Option<&M>) -> Result<M, PlanError> {
    let schema = M::schema();
    let mut planned = config.clone();

    for attribute in schema.attributes {
        let configured = config
            .get(attribute.name)
            .ok_or_else(|| ModelError::unknown_attribute(schema.type_name, attribute.name))?;
        let previous = prior.and_then(|p| p.get(attribute.name));

        let resolved = match attribute.mode {
            Mode::Required => {
                if configured.is_null() {
                    return Err(PlanError::MissingRequired {
                        type_name: schema.type_name,
                        attribute: attribute.name,
                    });
                }
                configured
            }
            Mode::Optional => configured,
            Mode::Computed => {
                if configured.is_known() {
                    return Err(PlanError::NotConfigurable {
                        type_name: schema.type_name,
                        attribute: attribute.name,
                    });
                }
                carry_prior(previous)
            }
            Mode::OptionalComputed => {
                if configured.is_null() {
                    carry_prior(previous)
                } else {
                    configured
                }
            }
        };

        planned.set(attribute.name, resolved)?;
    }

    Ok(planned)
}

fn carry_prior(previous: Option<crate::types::Dynamic>) -> crate::types::Dynamic {
    match previous {
        Some(value @ Value::Known(_)) => value,
        Some(Value::Null) => Value::Null,
        _ => Value::Unknown,
    }
}
