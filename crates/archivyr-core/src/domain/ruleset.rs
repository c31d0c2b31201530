use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RulesetName;

/// A stored ruleset: a named markdown document with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Unique, immutable identifier.
    pub name: RulesetName,
    /// Short human-readable summary.
    pub description: String,
    /// Ordered tags, possibly empty.
    pub tags: Vec<String>,
    /// Document body.
    pub markdown: String,
    /// Set once when the ruleset is created.
    pub created_at: DateTime<Utc>,
    /// Bumped on every successful update.
    pub last_modified: DateTime<Utc>,
}

/// The fields supplied when creating a ruleset.
///
/// Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewRuleset {
    /// Requested name. Validated by the store.
    pub name: String,
    /// Short human-readable summary.
    pub description: String,
    /// Ordered tags, possibly empty.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Document body.
    pub markdown: String,
}

impl NewRuleset {
    /// Stamps the new ruleset with its creation time.
    ///
    /// Both timestamps take the same value.
    #[must_use]
    pub fn into_ruleset(self, name: RulesetName, now: DateTime<Utc>) -> Ruleset {
        Ruleset {
            name,
            description: self.description,
            tags: self.tags,
            markdown: self.markdown,
            created_at: now,
            last_modified: now,
        }
    }
}

/// A partial update to an existing ruleset.
///
/// `None` leaves the stored value untouched; `Some` replaces it, even with an
/// empty value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesetUpdate {
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Replacement document body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

impl RulesetUpdate {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.tags.is_none() && self.markdown.is_none()
    }
}
