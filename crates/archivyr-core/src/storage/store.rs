//! Ruleset persistence on top of a [`KeyValueStore`].
//!
//! Each ruleset lives in its own hash under `ruleset:{name}` with the fields
//! `description`, `tags` (a JSON array), `markdown`, `created_at` and
//! `last_modified` (RFC 3339).
//!
//! The store does not lock between callers. Concurrent writes to the same
//! ruleset interleave per field, and the last write of each field wins.

use std::{collections::HashMap, fmt, sync::Arc, vec};

use chrono::Utc;

use crate::{
    domain::{NewRuleset, Ruleset, RulesetName, RulesetUpdate, glob, timestamp},
    storage::{Error, KeyValueStore, StoreError},
};

/// Prefix shared by every ruleset key.
pub const KEY_PREFIX: &str = "ruleset:";

mod field {
    pub const DESCRIPTION: &str = "description";
    pub const TAGS: &str = "tags";
    pub const MARKDOWN: &str = "markdown";
    pub const CREATED_AT: &str = "created_at";
    pub const LAST_MODIFIED: &str = "last_modified";
}

/// The result of [`RulesetStore::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No ruleset had the name; this one was created.
    Created(Ruleset),
    /// An existing ruleset was updated in place.
    Updated,
}

/// Create, read, update, delete and search rulesets.
///
/// The store keeps no state of its own. Every call goes to the injected
/// backend, and callers receive owned copies of the stored data.
#[derive(Clone)]
pub struct RulesetStore {
    client: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for RulesetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulesetStore").finish_non_exhaustive()
    }
}

impl RulesetStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(client: Arc<dyn KeyValueStore>) -> Self {
        Self { client }
    }

    fn key(name: &RulesetName) -> String {
        format!("{KEY_PREFIX}{name}")
    }

    /// Checks whether a ruleset with exactly this name is stored.
    ///
    /// # Errors
    ///
    /// Fails if the name is invalid or the backend cannot be reached.
    pub fn exists(&self, name: &str) -> Result<bool, Error> {
        let name = RulesetName::new(name)?;
        self.contains(&name)
    }

    fn contains(&self, name: &RulesetName) -> Result<bool, Error> {
        let count = self
            .client
            .exists(&[Self::key(name)])
            .map_err(|e| StoreError::backend("check if ruleset exists", e))?;
        Ok(count > 0)
    }

    /// Iterates over the names of all stored rulesets.
    ///
    /// Keys are fetched from the backend one scan page at a time. The order is
    /// whatever the backend returns.
    #[must_use]
    pub fn names(&self) -> Names<'_> {
        Names {
            store: self,
            cursor: Some(0),
            page: Vec::new().into_iter(),
        }
    }

    /// Collects the names of all stored rulesets. Order is not guaranteed.
    ///
    /// # Errors
    ///
    /// Fails if any scan of the backend fails.
    pub fn list_names(&self) -> Result<Vec<String>, Error> {
        self.names().collect()
    }

    /// Best-effort listing attached to duplicate and not-found errors.
    fn existing_names(&self) -> Option<Vec<String>> {
        self.list_names()
            .inspect_err(|error| tracing::debug!(%error, "could not list existing rulesets"))
            .ok()
    }

    /// Stores a new ruleset.
    ///
    /// Both timestamps are set to the current time; the stored ruleset is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if the name is not `snake_case`
    /// - [`Error::DuplicateName`] if the name is taken, with the currently
    ///   stored names when they can be listed
    /// - [`Error::Store`] if the backend fails
    pub fn create(&self, new: NewRuleset) -> Result<Ruleset, Error> {
        let name = RulesetName::new(new.name.as_str())?;
        self.insert(name, new)
    }

    fn insert(&self, name: RulesetName, new: NewRuleset) -> Result<Ruleset, Error> {
        if self.contains(&name)? {
            return Err(Error::DuplicateName {
                existing: self.existing_names(),
                name,
            });
        }

        let ruleset = new.into_ruleset(name, timestamp::now());
        let fields = [
            (field::DESCRIPTION, ruleset.description.clone()),
            (field::TAGS, encode_tags(&ruleset.name, &ruleset.tags)?),
            (field::MARKDOWN, ruleset.markdown.clone()),
            (field::CREATED_AT, timestamp::format(&ruleset.created_at)),
            (field::LAST_MODIFIED, timestamp::format(&ruleset.last_modified)),
        ];

        self.client
            .set_fields(&Self::key(&ruleset.name), &fields)
            .map_err(|e| StoreError::backend("create ruleset", e))?;

        tracing::debug!(name = %ruleset.name, "created ruleset");
        Ok(ruleset)
    }

    /// Fetches a ruleset by name.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if the name is not `snake_case`
    /// - [`Error::NotFound`] if nothing is stored under the name
    /// - [`Error::Store`] if the backend fails or a stored field is corrupt
    pub fn get(&self, name: &str) -> Result<Ruleset, Error> {
        let name = RulesetName::new(name)?;
        let fields = self
            .client
            .get_all_fields(&Self::key(&name))
            .map_err(|e| StoreError::backend("retrieve ruleset", e))?;

        if fields.is_empty() {
            return Err(Error::NotFound {
                name,
                existing: None,
            });
        }

        Ok(decode(name, fields)?)
    }

    /// Fetches every stored ruleset.
    ///
    /// Rulesets that cannot be read (for example because their data is
    /// corrupt, or they were deleted mid-listing) are left out.
    ///
    /// # Errors
    ///
    /// Fails only if the names cannot be listed.
    pub fn list(&self) -> Result<Vec<Ruleset>, Error> {
        let names = self.list_names()?;
        Ok(names.iter().filter_map(|name| self.get_or_skip(name)).collect())
    }

    /// Fetches every ruleset whose name matches the glob `pattern`.
    ///
    /// `*` matches any run of characters and `?` exactly one; the pattern is
    /// anchored to the whole name. `*` on its own returns every ruleset.
    /// Unreadable rulesets are skipped as in [`list`](Self::list).
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPattern`] if `pattern` is empty
    /// - [`Error::Store`] if the names cannot be scanned
    pub fn search(&self, pattern: &str) -> Result<Vec<Ruleset>, Error> {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }

        let mut results = Vec::new();
        for name in self.names() {
            let name = name?;
            if glob::matches(&name, pattern) {
                results.extend(self.get_or_skip(&name));
            }
        }

        tracing::debug!(pattern, matches = results.len(), "searched rulesets");
        Ok(results)
    }

    fn get_or_skip(&self, name: &str) -> Option<Ruleset> {
        self.get(name)
            .inspect_err(|error| tracing::warn!(name, %error, "skipping unreadable ruleset"))
            .ok()
    }

    /// Applies a partial update to an existing ruleset.
    ///
    /// Only the fields set in `update` are written; `last_modified` is always
    /// bumped, even if `update` is empty. `created_at` is never changed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if the name is not `snake_case`
    /// - [`Error::NotFound`] if nothing is stored under the name
    /// - [`Error::Store`] if the backend fails
    pub fn update(&self, name: &str, update: RulesetUpdate) -> Result<(), Error> {
        let name = RulesetName::new(name)?;
        if !self.contains(&name)? {
            return Err(Error::NotFound {
                name,
                existing: None,
            });
        }
        self.apply(&name, update)
    }

    fn apply(&self, name: &RulesetName, update: RulesetUpdate) -> Result<(), Error> {
        let mut staged = Vec::with_capacity(4);
        if let Some(description) = update.description {
            staged.push((field::DESCRIPTION, description));
        }
        if let Some(tags) = update.tags {
            staged.push((field::TAGS, encode_tags(name, &tags)?));
        }
        if let Some(markdown) = update.markdown {
            staged.push((field::MARKDOWN, markdown));
        }
        staged.push((field::LAST_MODIFIED, timestamp::format(&timestamp::now())));

        self.client
            .set_fields(&Self::key(name), &staged)
            .map_err(|e| StoreError::backend("update ruleset", e))?;

        tracing::debug!(%name, fields = staged.len(), "updated ruleset");
        Ok(())
    }

    /// Creates the ruleset if the name is free, otherwise updates it.
    ///
    /// When creating, `description` and `markdown` must be set in `update`;
    /// missing tags default to none.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if a field required for creation is absent
    /// - any error of [`create`](Self::create) or [`update`](Self::update)
    pub fn upsert(&self, name: &str, update: RulesetUpdate) -> Result<UpsertOutcome, Error> {
        let name = RulesetName::new(name)?;
        if self.contains(&name)? {
            self.apply(&name, update)?;
            return Ok(UpsertOutcome::Updated);
        }

        let missing = |field| Error::MissingField {
            name: name.clone(),
            field,
        };
        let new = NewRuleset {
            name: name.to_string(),
            description: update.description.ok_or_else(|| missing(field::DESCRIPTION))?,
            tags: update.tags.unwrap_or_default(),
            markdown: update.markdown.ok_or_else(|| missing(field::MARKDOWN))?,
        };

        self.insert(name, new).map(UpsertOutcome::Created)
    }

    /// Removes a ruleset.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if the name is not `snake_case`
    /// - [`Error::NotFound`] if nothing is stored under the name, with the
    ///   currently stored names when they can be listed
    /// - [`Error::Store`] if the backend fails
    pub fn delete(&self, name: &str) -> Result<(), Error> {
        let name = RulesetName::new(name)?;
        if !self.contains(&name)? {
            return Err(Error::NotFound {
                existing: self.existing_names(),
                name,
            });
        }

        self.client
            .delete(&[Self::key(&name)])
            .map_err(|e| StoreError::backend("delete ruleset", e))?;

        tracing::debug!(%name, "deleted ruleset");
        Ok(())
    }
}

/// Iterator over stored ruleset names, returned by [`RulesetStore::names`].
///
/// Holds at most one scan page in memory. Stops after the first backend
/// error.
#[derive(Debug)]
pub struct Names<'a> {
    store: &'a RulesetStore,
    cursor: Option<u64>,
    page: vec::IntoIter<String>,
}

impl Iterator for Names<'_> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            for key in self.page.by_ref() {
                match key.strip_prefix(KEY_PREFIX) {
                    Some(name) if !name.is_empty() => return Some(Ok(name.to_string())),
                    _ => {}
                }
            }

            let cursor = self.cursor?;
            match self.store.client.scan(cursor) {
                Ok(page) => {
                    self.page = page.keys.into_iter();
                    self.cursor = page.next;
                }
                Err(e) => {
                    self.cursor = None;
                    return Some(Err(StoreError::backend("scan ruleset keys", e).into()));
                }
            }
        }
    }
}

fn encode_tags(name: &RulesetName, tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(|e| StoreError::Encode {
        name: name.clone(),
        field: field::TAGS,
        reason: e.to_string(),
    })
}

fn decode(name: RulesetName, mut fields: HashMap<String, String>) -> Result<Ruleset, StoreError> {
    let corrupt = |field: &'static str, reason: String| StoreError::Decode {
        name: name.clone(),
        field,
        reason,
    };
    let mut required = |field: &'static str| {
        fields
            .remove(field)
            .ok_or_else(|| corrupt(field, "field is missing".to_string()))
    };

    let tags = serde_json::from_str(&required(field::TAGS)?)
        .map_err(|e| corrupt(field::TAGS, e.to_string()))?;
    let created_at = timestamp::parse(&required(field::CREATED_AT)?)
        .map_err(|e| corrupt(field::CREATED_AT, e.to_string()))?
        .with_timezone(&Utc);
    let last_modified = timestamp::parse(&required(field::LAST_MODIFIED)?)
        .map_err(|e| corrupt(field::LAST_MODIFIED, e.to_string()))?
        .with_timezone(&Utc);

    Ok(Ruleset {
        description: fields.remove(field::DESCRIPTION).unwrap_or_default(),
        markdown: fields.remove(field::MARKDOWN).unwrap_or_default(),
        name,
        tags,
        created_at,
        last_modified,
    })
}
