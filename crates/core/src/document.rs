//! JSON:API-shaped single-resource documents
//!
//! The payload accepted by `Store::push`:
//!
//! ```json
//! { "data": { "type": "user", "id": "1", "attributes": { "username": "@user" } } }
//! ```
//!
//! `lid` is accepted alongside `id` so a locally created record can be matched
//! to the document that gives it a remote id. Attributes and relationships are
//! kept as raw JSON; this module does not interpret them.
//!
//! A document is also an already-resolved pending document: it implements
//! `IntoFuture`, so APIs taking "a document or something that will become
//! one" accept both.

use crate::error::StrataResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::{ready, IntoFuture, Ready};

/// A single resource object (`data` member of a document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Remote id, absent for unsaved records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Local id of a record created in this store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lid: Option<String>,
    /// Attribute values
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Relationship payloads, stored unresolved
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub relationships: Map<String, Value>,
}

impl ResourceObject {
    /// Create a resource object with no attributes
    pub fn new(record_type: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            record_type: record_type.into(),
            id: id.map(str::to_string),
            lid: None,
            attributes: Map::new(),
            relationships: Map::new(),
        }
    }

    /// Set the local id
    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = Some(lid.into());
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a relationship payload
    pub fn with_relationship(mut self, name: impl Into<String>, value: Value) -> Self {
        self.relationships.insert(name.into(), value);
        self
    }
}

/// A document carrying exactly one primary resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResourceDocument {
    /// Primary resource
    pub data: ResourceObject,
    /// Top-level meta, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl SingleResourceDocument {
    /// Wrap a resource object
    pub fn new(data: ResourceObject) -> Self {
        Self { data, meta: None }
    }

    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns `Normalization` if the text is not a single-resource document.
    pub fn from_json(json: &str) -> StrataResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert a JSON value into a document
    ///
    /// # Errors
    ///
    /// Returns `Normalization` if the value is not a single-resource document.
    pub fn from_value(value: Value) -> StrataResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to a JSON value
    pub fn to_value(&self) -> Value {
        // Maps of JSON values with string keys always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<ResourceObject> for SingleResourceDocument {
    fn from(data: ResourceObject) -> Self {
        Self::new(data)
    }
}

impl IntoFuture for SingleResourceDocument {
    type Output = StrataResult<SingleResourceDocument>;
    type IntoFuture = Ready<StrataResult<SingleResourceDocument>>;

    fn into_future(self) -> Self::IntoFuture {
        ready(Ok(self))
    }
}
