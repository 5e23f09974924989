use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use schemafog_core::{DatabaseSchema, IdentifierMap};

use crate::error::Result;

/// Everything needed to rebuild one database under its identifier map.
#[derive(Debug, Clone, Copy)]
pub struct MaterializeRequest<'a> {
    pub db_id: &'a str,
    pub schema: &'a DatabaseSchema,
    pub map: &'a IdentifierMap,
    pub source_path: &'a Path,
    pub store_path: &'a Path,
}

/// Rows copied into one renamed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCopy {
    pub original: String,
    pub renamed: String,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub db_id: String,
    pub store_path: PathBuf,
    pub tables: Vec<TableCopy>,
}

impl MaterializeReport {
    pub fn total_rows(&self) -> i64 {
        self.tables.iter().map(|table| table.rows).sum()
    }
}

/// Trait implemented by store backends that can rebuild an anonymized copy.
#[async_trait]
pub trait Materializer {
    /// Returns the engine identifier (e.g. `sqlite`).
    fn engine(&self) -> &'static str;

    /// Recreate the store at `request.store_path` and copy every row.
    async fn materialize(&self, request: &MaterializeRequest<'_>) -> Result<MaterializeReport>;
}
