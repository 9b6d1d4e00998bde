//! Remote resolution kinds
//!
//! Every reference variant reports how the record it points at is found
//! remotely. Only identity resolution is implemented; `Link` and `Id` name the
//! relationship-backed variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a reference variant resolves its record remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteType {
    /// Found by composite `(type, id)` key
    Identity,
    /// Found by following a relationship link
    Link,
    /// Found by a foreign-key id on a relationship
    Id,
}

impl RemoteType {
    /// All remote types
    pub const ALL: [RemoteType; 3] = [RemoteType::Identity, RemoteType::Link, RemoteType::Id];

    /// Lowercase name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteType::Identity => "identity",
            RemoteType::Link => "link",
            RemoteType::Id => "id",
        }
    }
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
