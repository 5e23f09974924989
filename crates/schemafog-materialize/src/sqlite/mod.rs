use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{error, info};

use crate::ddl::{TableDdl, build_ddl};
use crate::error::{MaterializeError, Result};
use crate::materializer::{MaterializeReport, MaterializeRequest, Materializer, TableCopy};
use crate::options::MaterializeOptions;

mod queries;
pub mod values;

/// Materializer for SQLite stores.
#[derive(Debug, Clone, Default)]
pub struct SqliteMaterializer {
    options: MaterializeOptions,
}

impl SqliteMaterializer {
    pub fn new(options: MaterializeOptions) -> Self {
        Self { options }
    }
}

#[async_trait::async_trait]
impl Materializer for SqliteMaterializer {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    async fn materialize(&self, request: &MaterializeRequest<'_>) -> Result<MaterializeReport> {
        materialize(request, &self.options).await
    }
}

/// Rebuild one SQLite store with default options.
pub async fn materialize_sqlite(request: &MaterializeRequest<'_>) -> Result<MaterializeReport> {
    materialize(request, &MaterializeOptions::default()).await
}

/// Recreate the store, create every renamed table, then copy the data.
pub async fn materialize(
    request: &MaterializeRequest<'_>,
    opts: &MaterializeOptions,
) -> Result<MaterializeReport> {
    // Fails on a missing mapping entry before anything touches the disk.
    let ddl = build_ddl(request.schema, request.map)?;

    let store = create_store(request.store_path).await?;
    queries::set_foreign_keys(&store, false).await?;
    execute_ddl(&store, &ddl).await?;
    info!(
        db_id = %request.db_id,
        tables = ddl.len(),
        path = %request.store_path.display(),
        "store created"
    );

    let source = open_source(request.source_path).await?;
    let mut tables = Vec::with_capacity(ddl.len());
    for (entry, table) in ddl.iter().zip(request.schema.tables.values()) {
        let original_columns: Vec<&str> =
            table.columns.iter().map(|column| column.name.as_str()).collect();
        let renamed_columns = original_columns
            .iter()
            .map(|column| request.map.require(column))
            .collect::<schemafog_core::Result<Vec<_>>>()?;

        let rows = copy_table(&source, &store, entry, &original_columns, &renamed_columns).await?;
        if opts.verify_row_counts {
            let found = queries::count_rows(&store, &entry.renamed).await?;
            if found != rows {
                return Err(MaterializeError::RowCountMismatch {
                    table: entry.original.clone(),
                    expected: rows,
                    found,
                });
            }
        }

        tables.push(TableCopy {
            original: entry.original.clone(),
            renamed: entry.renamed.clone(),
            rows,
        });
    }

    if opts.enforce_foreign_keys {
        queries::set_foreign_keys(&store, true).await?;
    }
    source.close().await;
    store.close().await;

    let report = MaterializeReport {
        db_id: request.db_id.to_string(),
        store_path: request.store_path.to_path_buf(),
        tables,
    };
    info!(
        db_id = %request.db_id,
        rows = report.total_rows(),
        "data copied"
    );
    Ok(report)
}

/// Remove any previous store at `path` and open a fresh one.
async fn create_store(path: &Path) -> Result<SqlitePool> {
    if tokio::fs::try_exists(path).await? {
        tokio::fs::remove_file(path).await?;
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(false)
        .journal_mode(SqliteJournalMode::Delete);
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?)
}

async fn open_source(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new().filename(path).read_only(true);
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?)
}

async fn execute_ddl(store: &SqlitePool, ddl: &[TableDdl]) -> Result<()> {
    for entry in ddl {
        if let Err(err) = sqlx::query(&entry.statement).execute(store).await {
            error!(
                table = %entry.original,
                error = %err,
                statement = %entry.statement,
                "create table failed"
            );
            return Err(MaterializeError::DdlExecution {
                statement: entry.statement.clone(),
                message: err.to_string(),
            });
        }
    }
    Ok(())
}

/// Copy one table inside a single transaction; returns the source row count.
async fn copy_table(
    source: &SqlitePool,
    store: &SqlitePool,
    entry: &TableDdl,
    original_columns: &[&str],
    renamed_columns: &[&str],
) -> Result<i64> {
    let rows = queries::fetch_rows(source, &entry.original, original_columns).await?;
    let count = rows.len() as i64;
    if rows.is_empty() {
        return Ok(0);
    }

    let mut tx = store.begin().await?;
    queries::insert_rows(&mut *tx, &entry.renamed, renamed_columns, rows).await?;
    tx.commit().await?;
    Ok(count)
}
