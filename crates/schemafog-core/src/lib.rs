//! Core contracts and helpers for schemafog.
//!
//! This crate defines the canonical schema description, the ambiguity levels,
//! the persisted identifier map, and the reserved keyword table shared by the
//! anonymizer, the materializer, and the SQL rewriter.

pub mod error;
pub mod keywords;
pub mod layout;
pub mod level;
pub mod mapping;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use keywords::{RESERVED_KEYWORDS, is_reserved_keyword};
pub use layout::{OutputLayout, source_store_path};
pub use level::AmbiguityLevel;
pub use mapping::{IdentifierMap, to_json_pretty, write_file};
pub use schema::{Column, DatabaseSchema, ForeignKeyDescriptor, ForeignKeyRef, Table};
pub use validation::validate_schema;

/// Marker prefixed to generated names that collide with a reserved keyword.
pub const KEYWORD_PREFIX: &str = "f_";
