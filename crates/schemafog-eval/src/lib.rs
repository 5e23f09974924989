//! Verification and reporting for anonymized datasets.

pub mod errors;
pub mod mapping_metrics;
pub mod report;
pub mod verify;

pub use errors::{EvalError, Result};
pub use mapping_metrics::{MappingCounts, MappingMetrics, RewriteCoverage, collect_mapping_metrics};
pub use report::{DatabaseReport, DatabaseStatus, render_report};
pub use verify::{
    DEFAULT_QUERY_TIMEOUT, QueryExecutor, QueryFailure, SampleVerification, SqliteExecutor,
    VerificationOutcome, VerificationSummary, verify_query, verify_samples,
};
