//! Errors raised by the entity controllers.
//!
//! Every variant names the entity kind and the identifier involved.

use crate::codec::CodecError;
use crate::resource::EntityKind;
use std::fmt;

/// The identifier a failing operation was working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Not assigned yet (create)
    New,
    /// Numeric id, or the "channel:site" pair
    Known(String),
}

impl Identity {
    pub fn from_id(id: Option<&i64>) -> Self {
        id.map_or(Self::New, |id| Self::Known(id.to_string()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "(new)"),
            Self::Known(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("{kind} {id}: API request failed: {source}")]
    Api {
        kind: EntityKind,
        id: Identity,
        #[source]
        source: kevelkit::Error,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Identity },

    #[error("invalid {kind} import id `{input}`: {reason}")]
    InvalidImportId {
        kind: EntityKind,
        input: String,
        reason: String,
    },

    #[error("{kind} {id}: {operation} is not supported")]
    Unsupported {
        kind: EntityKind,
        id: Identity,
        operation: &'static str,
    },

    #[error("{kind} {id}: {source}")]
    Encoding {
        kind: EntityKind,
        id: Identity,
        #[source]
        source: CodecError,
    },
}

impl ResourceError {
    /// Wrap an API error; a not-found answer becomes [`ResourceError::NotFound`].
    pub fn api(kind: EntityKind, id: Identity, source: kevelkit::Error) -> Self {
        if source.is_not_found() {
            Self::NotFound { kind, id }
        } else {
            Self::Api { kind, id, source }
        }
    }

    pub fn encoding(kind: EntityKind, id: Identity, source: CodecError) -> Self {
        Self::Encoding { kind, id, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
