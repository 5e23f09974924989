use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::DatabaseSchema;

/// Validate internal consistency of a schema description.
///
/// This checks:
/// - table and column names are non-empty
/// - no duplicate tables, or duplicate columns within a table (ignoring case)
/// - primary key columns exist in their table
///
/// Foreign key descriptors are not checked; malformed ones are skipped downstream.
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    let mut tables = BTreeSet::new();

    for (table_name, table) in &schema.tables {
        if table_name.trim().is_empty() {
            return Err(Error::InvalidSchema("empty table name".to_string()));
        }
        if !tables.insert(table_name.to_lowercase()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {table_name}"
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if column.name.trim().is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "empty column name in table {table_name}"
                )));
            }
            if !columns.insert(column.name.to_lowercase()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {table_name}.{}",
                    column.name
                )));
            }
        }

        for key in &table.primary_keys {
            if !columns.contains(&key.to_lowercase()) {
                return Err(Error::InvalidSchema(format!(
                    "primary key column not found: {table_name}.{key}"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(input: &str) -> DatabaseSchema {
        DatabaseSchema::from_json_str(input).unwrap()
    }

    #[test]
    fn accepts_consistent_schema() {
        let schema = schema(
            r#"{"singer": {"columns": [{"name": "id", "type": "INT", "pk": true}], "primary_keys": ["ID"]}}"#,
        );
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_case_insensitive_duplicate_columns() {
        let schema = schema(
            r#"{"singer": {"columns": [{"name": "Name", "type": "TEXT"}, {"name": "name", "type": "TEXT"}]}}"#,
        );
        let err = validate_schema(&schema).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn rejects_missing_primary_key_column() {
        let schema = schema(
            r#"{"singer": {"columns": [{"name": "id", "type": "INT"}], "primary_keys": ["singer_id"]}}"#,
        );
        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("singer.singer_id"));
    }
}
