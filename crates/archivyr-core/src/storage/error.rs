use crate::{
    domain::{InvalidNameError, RulesetName},
    storage::BackendError,
};

/// Errors returned by [`RulesetStore`](crate::RulesetStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied name is not a valid ruleset name. The store was not
    /// touched.
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    /// Search was called with an empty pattern.
    #[error("search pattern cannot be empty")]
    EmptyPattern,

    /// A ruleset with this name already exists.
    #[error("ruleset '{name}' already exists{}", duplicate_hint(.existing.as_deref()))]
    DuplicateName {
        /// The conflicting name.
        name: RulesetName,
        /// Names stored at the time of the failure, if they could be listed.
        existing: Option<Vec<String>>,
    },

    /// No ruleset with this name exists.
    #[error("ruleset '{name}' not found{}", existing_hint(.existing.as_deref()))]
    NotFound {
        /// The missing name.
        name: RulesetName,
        /// Names stored at the time of the failure, if they were listed.
        existing: Option<Vec<String>>,
    },

    /// A field required to create a ruleset was not supplied.
    #[error("'{field}' is required to create ruleset '{name}'")]
    MissingField {
        /// The ruleset being created.
        name: RulesetName,
        /// The absent field.
        field: &'static str,
    },

    /// The backend failed or returned data that could not be decoded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// The stored names attached to a duplicate or not-found error.
    #[must_use]
    pub fn existing_names(&self) -> Option<&[String]> {
        match self {
            Self::DuplicateName { existing, .. } | Self::NotFound { existing, .. } => {
                existing.as_deref()
            }
            _ => None,
        }
    }
}

/// A failure of the underlying store rather than of the request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A backend call failed.
    #[error("failed to {operation}: {source}")]
    Backend {
        /// What the store was doing, e.g. "check if ruleset exists".
        operation: &'static str,
        /// The backend's error.
        source: BackendError,
    },

    /// A field could not be encoded for storage.
    #[error("failed to encode '{field}' for ruleset '{name}': {reason}")]
    Encode {
        /// The ruleset being written.
        name: RulesetName,
        /// The field that failed to encode.
        field: &'static str,
        /// Why encoding failed.
        reason: String,
    },

    /// A stored field could not be decoded.
    #[error("ruleset '{name}' has a corrupt '{field}' field: {reason}")]
    Decode {
        /// The ruleset whose data is corrupt.
        name: RulesetName,
        /// The field that failed to decode.
        field: &'static str,
        /// Why decoding failed.
        reason: String,
    },
}

impl StoreError {
    pub(crate) const fn backend(operation: &'static str, source: BackendError) -> Self {
        Self::Backend { operation, source }
    }
}

fn duplicate_hint(existing: Option<&[String]>) -> String {
    existing.map_or_else(String::new, |names| {
        format!(
            ". Please choose a different name. Existing rulesets: [{}]",
            names.join(", ")
        )
    })
}

fn existing_hint(existing: Option<&[String]>) -> String {
    existing.map_or_else(String::new, |names| {
        format!(". Existing rulesets: [{}]", names.join(", "))
    })
}
