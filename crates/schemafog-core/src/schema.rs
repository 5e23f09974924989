use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Canonical schema description for one database, keyed by table name.
///
/// Table order follows the source document; it drives DDL and copy order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseSchema {
    pub tables: IndexMap<String, Table>,
}

/// Table entry of the canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

/// Column metadata in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type; SQLite allows it to be empty.
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default, deserialize_with = "flag")]
    pub notnull: bool,
    #[serde(default, deserialize_with = "flag")]
    pub pk: bool,
}

/// Foreign key as emitted by the schema extractor.
///
/// `target_column` is the referencing column of the owning table;
/// `source_table`/`source_column` name the referenced key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDescriptor {
    #[serde(default)]
    pub source_table: Option<String>,
    #[serde(default)]
    pub source_column: Option<String>,
    #[serde(default)]
    pub target_column: Option<String>,
}

/// Borrowed view of a descriptor whose fields are all present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRef<'a> {
    pub source_table: &'a str,
    pub source_column: &'a str,
    pub target_column: &'a str,
}

impl ForeignKeyDescriptor {
    /// Returns `None` when any required field is missing.
    pub fn well_formed(&self) -> Option<ForeignKeyRef<'_>> {
        Some(ForeignKeyRef {
            source_table: self.source_table.as_deref()?,
            source_column: self.source_column.as_deref()?,
            target_column: self.target_column.as_deref()?,
        })
    }
}

impl Table {
    /// Key columns: the explicit `primary_keys` list, else columns flagged `pk`.
    pub fn key_columns(&self) -> Vec<&str> {
        if !self.primary_keys.is_empty() {
            return self.primary_keys.iter().map(String::as_str).collect();
        }
        self.columns
            .iter()
            .filter(|column| column.pk)
            .map(|column| column.name.as_str())
            .collect()
    }
}

impl DatabaseSchema {
    /// Parse a schema document, bare or wrapped as `{"schema": {...}}`.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(input)?;
        Ok(match document {
            SchemaDocument::Wrapped { schema } => schema,
            SchemaDocument::Bare(schema) => schema,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.tables.values().map(|table| table.columns.len()).sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Wrapped { schema: DatabaseSchema },
    Bare(DatabaseSchema),
}

/// Accept `true`/`false`, integers (SQLite `PRAGMA` style), or null.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Null(()) => false,
    })
}
