//! Executes rewritten queries against an anonymized store.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info, warn};

use schemafog_rewrite::AnonymizedSample;

use crate::errors::Result;

/// Per-query limit applied when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// VM instructions between two deadline checks.
const PROGRESS_INTERVAL_OPS: i32 = 1_000;

/// Why a single query did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    TimedOut,
    Failed(String),
}

/// Something that can run one query and report whether it succeeded.
#[async_trait]
pub trait QueryExecutor {
    /// Execute `sql` and fetch at most one row, giving up after `limit`.
    async fn execute(&self, sql: &str, limit: Duration) -> std::result::Result<(), QueryFailure>;
}

/// Read-only executor over one SQLite store.
///
/// Every query gets its own connection, and SQLite interrupts the statement
/// once the deadline passes, so a runaway query never holds up the next one.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    options: SqliteConnectOptions,
}

impl SqliteExecutor {
    /// Fails when the store cannot be opened.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        options.connect().await?.close().await?;
        Ok(Self { options })
    }

    async fn connect(&self, deadline: Instant) -> sqlx::Result<SqliteConnection> {
        let mut conn = self.options.connect().await?;
        {
            let mut handle = conn.lock_handle().await?;
            handle.set_progress_handler(PROGRESS_INTERVAL_OPS, move || Instant::now() < deadline);
        }
        Ok(conn)
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, sql: &str, limit: Duration) -> std::result::Result<(), QueryFailure> {
        let deadline = Instant::now() + limit;
        let mut conn = self
            .connect(deadline)
            .await
            .map_err(|err| QueryFailure::Failed(err.to_string()))?;

        let result = sqlx::query(sql).fetch_optional(&mut conn).await;
        if let Err(err) = conn.close().await {
            debug!(error = %err, "closing verification connection failed");
        }

        match result {
            Ok(_) => Ok(()),
            Err(_) if Instant::now() >= deadline => Err(QueryFailure::TimedOut),
            Err(err) => Err(QueryFailure::Failed(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Ok,
    Timeout,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleVerification {
    pub db_id: String,
    pub query: String,
    pub outcome: VerificationOutcome,
}

/// Outcome counts over a batch of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub ok: usize,
    pub timeouts: usize,
    pub errors: usize,
}

impl VerificationSummary {
    pub fn from_results(results: &[SampleVerification]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.outcome {
                VerificationOutcome::Ok => summary.ok += 1,
                VerificationOutcome::Timeout => summary.timeouts += 1,
                VerificationOutcome::Error { .. } => summary.errors += 1,
            }
        }
        summary
    }

    pub fn failed(&self) -> usize {
        self.timeouts + self.errors
    }
}

/// Run one query under `limit`.
///
/// The executor enforces the limit itself; the outer timeout covers
/// executors that cannot interrupt their work.
pub async fn verify_query(
    executor: &(impl QueryExecutor + Sync),
    sql: &str,
    limit: Duration,
) -> VerificationOutcome {
    match tokio::time::timeout(limit, executor.execute(sql, limit)).await {
        Ok(Ok(())) => VerificationOutcome::Ok,
        Ok(Err(QueryFailure::Failed(message))) => VerificationOutcome::Error { message },
        Ok(Err(QueryFailure::TimedOut)) | Err(_) => VerificationOutcome::Timeout,
    }
}

/// Verify each sample in turn; failures are logged and recorded, never raised.
pub async fn verify_samples(
    executor: &(impl QueryExecutor + Sync),
    samples: &[AnonymizedSample],
    limit: Duration,
) -> Vec<SampleVerification> {
    let mut results = Vec::with_capacity(samples.len());
    for sample in samples {
        let outcome = verify_query(executor, &sample.query, limit).await;
        match &outcome {
            VerificationOutcome::Ok => {}
            VerificationOutcome::Timeout => {
                warn!(db_id = %sample.db_id, query = %sample.query, "query timed out");
            }
            VerificationOutcome::Error { message } => {
                warn!(
                    db_id = %sample.db_id,
                    query = %sample.query,
                    error = %message,
                    "query failed"
                );
            }
        }
        results.push(SampleVerification {
            db_id: sample.db_id.clone(),
            query: sample.query.clone(),
            outcome,
        });
    }

    let summary = VerificationSummary::from_results(&results);
    info!(
        total = summary.total,
        ok = summary.ok,
        failed = summary.failed(),
        "samples verified"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubExecutor;

    #[async_trait]
    impl QueryExecutor for StubExecutor {
        async fn execute(
            &self,
            sql: &str,
            _limit: Duration,
        ) -> std::result::Result<(), QueryFailure> {
            match sql {
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
                "interrupted" => Err(QueryFailure::TimedOut),
                "bad" => Err(QueryFailure::Failed("no such table: t".to_string())),
                _ => Ok(()),
            }
        }
    }

    fn sample(query: &str) -> AnonymizedSample {
        AnonymizedSample {
            db_id: "concert_singer".to_string(),
            question: "q".to_string(),
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn records_every_outcome_kind() {
        let samples = [
            sample("fine"),
            sample("bad"),
            sample("slow"),
            sample("interrupted"),
        ];
        let results = verify_samples(&StubExecutor, &samples, Duration::from_millis(50)).await;

        let outcomes: Vec<&VerificationOutcome> =
            results.iter().map(|result| &result.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                &VerificationOutcome::Ok,
                &VerificationOutcome::Error {
                    message: "no such table: t".to_string()
                },
                &VerificationOutcome::Timeout,
                &VerificationOutcome::Timeout,
            ]
        );

        let summary = VerificationSummary::from_results(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.failed(), 3);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(VerificationOutcome::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "message": "boom" }));
    }
}
