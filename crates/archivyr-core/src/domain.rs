//! Domain models for ruleset management.
//!
//! This module contains the validated ruleset name, the ruleset entity and its
//! partial-update overlay, plus the pure helpers used by the store: timestamp
//! encoding and glob matching.

/// Glob matching for ruleset name search.
pub mod glob;

mod name;
pub use name::{InvalidNameError, RulesetName, validate_name};

mod ruleset;
pub use ruleset::{NewRuleset, Ruleset, RulesetUpdate};

/// Fixed text encoding for stored timestamps.
pub mod timestamp;
