//! `CREATE TABLE` generation for anonymized stores.

use tracing::{debug, warn};

use schemafog_core::{DatabaseSchema, IdentifierMap, Table};

use crate::error::Result;

/// One generated statement and the table it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDdl {
    pub original: String,
    pub renamed: String,
    pub statement: String,
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Statements for every table, in schema order.
pub fn build_ddl(schema: &DatabaseSchema, map: &IdentifierMap) -> Result<Vec<TableDdl>> {
    schema
        .tables
        .iter()
        .map(|(name, table)| -> Result<TableDdl> {
            Ok(TableDdl {
                original: name.clone(),
                renamed: map.require(name)?.to_string(),
                statement: create_table_statement(name, table, map)?,
            })
        })
        .collect()
}

/// Render the renamed `CREATE TABLE` for one table.
///
/// Every table and column identifier must have a mapping entry. Foreign keys
/// with a missing field, or naming an identifier outside the mapping, are
/// left out.
pub fn create_table_statement(
    table_name: &str,
    table: &Table,
    map: &IdentifierMap,
) -> Result<String> {
    let renamed_table = map.require(table_name)?;
    let keys = table.key_columns();
    let single_key = match keys.as_slice() {
        [only] => Some(only.to_lowercase()),
        _ => None,
    };

    let mut lines = Vec::with_capacity(table.columns.len() + table.foreign_keys.len() + 1);
    for column in &table.columns {
        let mut line = quote_identifier(map.require(&column.name)?);
        if !column.data_type.is_empty() {
            line.push(' ');
            line.push_str(&column.data_type);
        }
        if column.notnull {
            line.push_str(" NOT NULL");
        }
        if single_key.as_deref() == Some(column.name.to_lowercase().as_str()) {
            line.push_str(" PRIMARY KEY");
        }
        lines.push(line);
    }

    if keys.len() > 1 {
        let renamed = keys
            .iter()
            .map(|key| map.require(key).map(quote_identifier))
            .collect::<schemafog_core::Result<Vec<_>>>()?;
        lines.push(format!("PRIMARY KEY ({})", renamed.join(", ")));
    }

    for descriptor in &table.foreign_keys {
        let Some(fk) = descriptor.well_formed() else {
            debug!(table = %table_name, "skipping incomplete foreign key");
            continue;
        };

        let (Some(target_column), Some(source_table), Some(source_column)) = (
            map.lookup(fk.target_column),
            map.lookup(fk.source_table),
            map.lookup(fk.source_column),
        ) else {
            warn!(
                table = %table_name,
                source_table = %fk.source_table,
                source_column = %fk.source_column,
                target_column = %fk.target_column,
                "skipping foreign key outside the mapping"
            );
            continue;
        };

        lines.push(format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            quote_identifier(target_column),
            quote_identifier(source_table),
            quote_identifier(source_column),
        ));
    }

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n);",
        quote_identifier(renamed_table),
        lines.join(",\n    ")
    ))
}
