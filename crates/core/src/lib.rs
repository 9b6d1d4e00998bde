//! Core types for Strata record references
//!
//! This crate defines the leaf types shared by the store and the reference layer:
//! - RecordIdentifier: Stable `(type, id)` identity of a record slot
//! - SingleResourceDocument / ResourceObject: JSON:API-shaped push payloads
//! - RemoteType: How a reference variant is resolved remotely
//! - StrataError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod identifier;
pub mod remote_type;

pub use document::{ResourceObject, SingleResourceDocument};
pub use error::{StrataError, StrataResult};
pub use identifier::RecordIdentifier;
pub use remote_type::RemoteType;
