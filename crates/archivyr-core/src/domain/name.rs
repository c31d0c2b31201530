use std::{fmt, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static SNAKE_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("snake_case pattern is valid")
});

/// Checks that `name` is a valid ruleset name.
///
/// A valid name starts with a lowercase letter, followed by lowercase letters
/// and digits, optionally split into segments by single underscores, e.g.
/// `python_style_guide` or `go2_rules`.
///
/// # Errors
///
/// Returns an [`InvalidNameError`] if the name is empty or does not follow the
/// `snake_case` convention.
pub fn validate_name(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::Empty);
    }

    if !SNAKE_CASE.is_match(name) {
        return Err(InvalidNameError::NotSnakeCase(name.to_string()));
    }

    Ok(())
}

/// Error returned when a string is not a valid ruleset name.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidNameError {
    /// The name was the empty string.
    #[error("ruleset name cannot be empty")]
    Empty,

    /// The name contained characters or underscores outside the allowed
    /// grammar.
    #[error(
        "ruleset name must be in snake_case format (lowercase letters, numbers, and underscores \
         only, starting with a letter): {0}"
    )]
    NotSnakeCase(String),
}

/// A validated ruleset name.
///
/// The name is the primary key of a ruleset and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RulesetName(String);

impl RulesetName {
    /// Creates a new `RulesetName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidNameError`] if the string is not `snake_case`.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RulesetName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RulesetName {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RulesetName> for String {
    fn from(name: RulesetName) -> Self {
        name.0
    }
}

impl AsRef<str> for RulesetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for RulesetName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for RulesetName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RulesetName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
