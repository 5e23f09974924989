//! Rebuilds anonymized SQLite stores from an identifier map.
//!
//! A store is recreated from scratch: renamed `CREATE TABLE` statements are
//! executed with foreign key enforcement off, then every source row is copied
//! in original column order.

pub mod ddl;
pub mod error;
pub mod materializer;
pub mod options;
pub mod sqlite;

pub use ddl::{TableDdl, build_ddl, create_table_statement, quote_identifier};
pub use error::{MaterializeError, Result};
pub use materializer::{MaterializeReport, MaterializeRequest, Materializer, TableCopy};
pub use options::MaterializeOptions;
pub use sqlite::values::{CellValue, safe_decode};
pub use sqlite::{SqliteMaterializer, materialize_sqlite};
