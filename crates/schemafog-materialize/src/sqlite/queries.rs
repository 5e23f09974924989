use sqlx::{SqliteConnection, SqlitePool};

use crate::ddl::quote_identifier;
use crate::error::Result;
use crate::sqlite::values::CellValue;

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn set_foreign_keys(pool: &SqlitePool, enabled: bool) -> Result<()> {
    let pragma = if enabled {
        "PRAGMA foreign_keys = ON"
    } else {
        "PRAGMA foreign_keys = OFF"
    };
    sqlx::query(pragma).execute(pool).await?;
    Ok(())
}

/// All rows of `table`, columns in the given order.
pub async fn fetch_rows(
    pool: &SqlitePool,
    table: &str,
    columns: &[&str],
) -> Result<Vec<Vec<CellValue>>> {
    let sql = format!(
        "SELECT {} FROM {}",
        column_list(columns),
        quote_identifier(table)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut values = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            cells.push(CellValue::read(row, index)?);
        }
        values.push(cells);
    }
    Ok(values)
}

pub async fn insert_rows(
    conn: &mut SqliteConnection,
    table: &str,
    columns: &[&str],
    rows: Vec<Vec<CellValue>>,
) -> Result<()> {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        column_list(columns),
        placeholders
    );

    for row in rows {
        let query = row
            .into_iter()
            .fold(sqlx::query(&sql), |query, value| value.bind(query));
        query.execute(&mut *conn).await?;
    }
    Ok(())
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?)
}
