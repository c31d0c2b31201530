//! Core types and logic for storing AI editor rulesets.
//!
//! Rulesets are named markdown documents persisted as field maps in a
//! key-value store (Valkey in production). This crate owns the key schema,
//! the field encodings, glob search and the partial-update merge rules.

/// Domain types: ruleset names, timestamps, glob patterns and rulesets.
pub mod domain;
pub use domain::{InvalidNameError, NewRuleset, Ruleset, RulesetName, RulesetUpdate};

/// Key-value backends and the ruleset store built on top of them.
pub mod storage;
pub use storage::{
    BackendError, Error, KeyValueStore, MemoryStore, RulesetStore, StoreError, UpsertOutcome,
    ValkeyClient,
};
