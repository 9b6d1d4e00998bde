//! Identifier cache
//!
//! Issues exactly one `RecordIdentifier` per `(type, id)` and per `lid`.
//! Both indexes are `DashMap`s so identifier lookups from unrelated
//! identities never contend on one lock.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use strata_core::{RecordIdentifier, ResourceObject, StrataError, StrataResult};
use uuid::Uuid;

pub(crate) struct IdentifierCache {
    lid_prefix: String,
    by_key: DashMap<(String, String), RecordIdentifier>,
    by_lid: DashMap<String, RecordIdentifier>,
}

impl IdentifierCache {
    pub(crate) fn new(lid_prefix: impl Into<String>) -> Self {
        Self {
            lid_prefix: lid_prefix.into(),
            by_key: DashMap::new(),
            by_lid: DashMap::new(),
        }
    }

    fn generate_lid(&self) -> String {
        format!("{}{}", self.lid_prefix, Uuid::new_v4())
    }

    fn index_lid(&self, identifier: &RecordIdentifier) {
        self.by_lid
            .insert(identifier.lid().to_string(), identifier.clone());
    }

    /// The identifier for `(record_type, id)`, created on first request
    pub(crate) fn get_or_create(&self, record_type: &str, id: &str) -> RecordIdentifier {
        let key = (record_type.to_string(), id.to_string());
        if let Some(existing) = self.by_key.get(&key) {
            return existing.clone();
        }
        let identifier = match self.by_key.entry(key) {
            Entry::Occupied(e) => return e.get().clone(),
            Entry::Vacant(v) => {
                let identifier =
                    RecordIdentifier::new(self.generate_lid(), record_type, Some(id.to_string()));
                v.insert(identifier.clone());
                identifier
            }
        };
        self.index_lid(&identifier);
        identifier
    }

    /// A fresh identifier with no remote id
    pub(crate) fn create_local(&self, record_type: &str) -> RecordIdentifier {
        self.create_with_lid(record_type, self.generate_lid())
    }

    fn create_with_lid(&self, record_type: &str, lid: String) -> RecordIdentifier {
        match self.by_lid.entry(lid) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(v) => {
                let identifier = RecordIdentifier::new(v.key().clone(), record_type, None);
                v.insert(identifier.clone());
                identifier
            }
        }
    }

    pub(crate) fn peek(&self, record_type: &str, id: &str) -> Option<RecordIdentifier> {
        self.by_key
            .get(&(record_type.to_string(), id.to_string()))
            .map(|e| e.clone())
    }

    pub(crate) fn by_lid(&self, lid: &str) -> Option<RecordIdentifier> {
        self.by_lid.get(lid).map(|e| e.clone())
    }

    /// Resolve the identity a pushed resource refers to
    ///
    /// A resource carrying both the `lid` of an id-less identifier and an `id`
    /// assigns that id to the identifier.
    ///
    /// # Errors
    ///
    /// Returns `Normalization` when the type is empty, when `lid` belongs to a
    /// different type, or when `lid` and `id` name two different identities.
    pub(crate) fn resolve(&self, resource: &ResourceObject) -> StrataResult<RecordIdentifier> {
        let record_type = resource.record_type.as_str();
        if record_type.is_empty() {
            return Err(StrataError::normalization("resource is missing its type"));
        }

        let lid = resource.lid.as_deref();
        let known = match lid {
            Some(lid) => self.by_lid(lid),
            None => None,
        };
        if let (Some(lid), Some(identifier)) = (lid, &known) {
            check_lid_type(lid, identifier, record_type)?;
        }

        match (resource.id.as_deref(), lid) {
            (Some(id), None) => Ok(self.get_or_create(record_type, id)),
            (None, None) => Ok(self.create_local(record_type)),
            (None, Some(lid)) => match known {
                Some(identifier) => Ok(identifier),
                None => self.adopt_lid(record_type, lid),
            },
            (Some(id), Some(lid)) => {
                let key = (record_type.to_string(), id.to_string());
                match self.by_key.entry(key) {
                    Entry::Occupied(e) => match known {
                        Some(identifier) if e.get() == &identifier => Ok(identifier),
                        _ => Err(StrataError::normalization(format!(
                            "lid '{}' and id '{}' refer to different records ({} already exists)",
                            lid,
                            id,
                            e.get()
                        ))),
                    },
                    Entry::Vacant(v) => {
                        let identifier = match known {
                            Some(identifier) => identifier,
                            None => self.adopt_lid(record_type, lid)?,
                        };
                        identifier.assign_id(id)?;
                        v.insert(identifier.clone());
                        Ok(identifier)
                    }
                }
            }
        }
    }

    /// Index a client-supplied `lid` once the resource is known to be valid
    fn adopt_lid(&self, record_type: &str, lid: &str) -> StrataResult<RecordIdentifier> {
        let identifier = self.create_with_lid(record_type, lid.to_string());
        check_lid_type(lid, &identifier, record_type)?;
        Ok(identifier)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_lid.len()
    }
}

fn check_lid_type(lid: &str, identifier: &RecordIdentifier, record_type: &str) -> StrataResult<()> {
    if identifier.record_type() == record_type {
        return Ok(());
    }
    Err(StrataError::normalization(format!(
        "lid '{}' belongs to type '{}', not '{}'",
        lid,
        identifier.record_type(),
        record_type
    )))
}
