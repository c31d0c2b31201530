//! Persistence for rulesets.
//!
//! The [`RulesetStore`] maps rulesets onto hashes in a [`KeyValueStore`]. The
//! backend is injected, so the same store runs against Valkey in production
//! ([`ValkeyClient`]) and against an in-process map in tests
//! ([`MemoryStore`]).

mod error;
pub use error::{Error, StoreError};

/// The key-value interface the store consumes.
pub mod kv;
pub use kv::{BackendError, KeyValueStore, ScanPage};

mod memory;
pub use memory::MemoryStore;

mod store;
pub use store::{KEY_PREFIX, Names, RulesetStore, UpsertOutcome};

mod valkey;
pub use valkey::ValkeyClient;
