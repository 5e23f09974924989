use serde::{Deserialize, Serialize};

use schemafog_anonymize::Operator;
use schemafog_core::AmbiguityLevel;

use crate::mapping_metrics::MappingMetrics;
use crate::verify::{SampleVerification, VerificationOutcome, VerificationSummary};

/// Outcome of processing one database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatabaseStatus {
    Completed,
    Failed { stage: String, error: String },
}

/// Per-database entry of a run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseReport {
    pub db_id: String,
    pub status: DatabaseStatus,
    pub rows_copied: i64,
    pub samples_rewritten: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MappingMetrics>,
}

impl DatabaseReport {
    pub fn new(db_id: impl Into<String>) -> Self {
        Self {
            db_id: db_id.into(),
            status: DatabaseStatus::Completed,
            rows_copied: 0,
            samples_rewritten: 0,
            verification: None,
            metrics: None,
        }
    }

    pub fn failed(&self) -> bool {
        matches!(self.status, DatabaseStatus::Failed { .. })
    }
}

/// Render a deterministic markdown report for one (dataset, level) run.
pub fn render_report(
    dataset: &str,
    level: AmbiguityLevel,
    databases: &[DatabaseReport],
    verifications: &[SampleVerification],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Schemafog Anonymization Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- dataset: {dataset}"));
    lines.push(format!("- level: {level}"));
    lines.push(format!("- databases: {}", databases.len()));
    lines.push(format!(
        "- failed databases: {}",
        databases.iter().filter(|db| db.failed()).count()
    ));
    lines.push(String::new());

    lines.push("## Databases".to_string());
    lines.push("| db_id | status | rows | samples | verified ok | failed queries |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- |".to_string());
    for db in databases {
        let status = match &db.status {
            DatabaseStatus::Completed => "completed".to_string(),
            DatabaseStatus::Failed { stage, .. } => format!("failed ({stage})"),
        };
        let (ok, failed) = db
            .verification
            .map(|summary| (summary.ok.to_string(), summary.failed().to_string()))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            db.db_id, status, db.rows_copied, db.samples_rewritten, ok, failed
        ));
    }
    lines.push(String::new());

    lines.push("## Operator usage".to_string());
    lines.push("| operator | identifiers |".to_string());
    lines.push("| --- | --- |".to_string());
    for operator in Operator::CANONICAL_ORDER {
        let total: usize = databases
            .iter()
            .filter_map(|db| db.metrics.as_ref())
            .map(|metrics| metrics.operators.get(&operator).copied().unwrap_or(0))
            .sum();
        lines.push(format!("| {operator} | {total} |"));
    }
    lines.push(String::new());

    let errors: Vec<String> = databases
        .iter()
        .filter_map(|db| match &db.status {
            DatabaseStatus::Failed { stage, error } => {
                Some(format!("- {} ({stage}): {error}", db.db_id))
            }
            DatabaseStatus::Completed => None,
        })
        .collect();
    if !errors.is_empty() {
        lines.push("## Errors".to_string());
        lines.extend(errors);
        lines.push(String::new());
    }

    let failures: Vec<&SampleVerification> = verifications
        .iter()
        .filter(|result| result.outcome != VerificationOutcome::Ok)
        .collect();
    if !failures.is_empty() {
        lines.push("## Failed queries".to_string());
        for failure in failures.iter().take(max_examples) {
            let reason = match &failure.outcome {
                VerificationOutcome::Timeout => "timeout".to_string(),
                VerificationOutcome::Error { message } => message.clone(),
                VerificationOutcome::Ok => continue,
            };
            lines.push(format!("- {}: `{}` ({reason})", failure.db_id, failure.query));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_and_failures() {
        let mut ok = DatabaseReport::new("concert_singer");
        ok.rows_copied = 42;
        ok.samples_rewritten = 2;
        ok.verification = Some(VerificationSummary {
            total: 2,
            ok: 1,
            timeouts: 1,
            errors: 0,
        });
        let mut broken = DatabaseReport::new("pets_1");
        broken.status = DatabaseStatus::Failed {
            stage: "materialize".to_string(),
            error: "duplicate column name".to_string(),
        };
        let verifications = [SampleVerification {
            db_id: "concert_singer".to_string(),
            query: "SELECT nm FROM sngr".to_string(),
            outcome: VerificationOutcome::Timeout,
        }];

        let report = render_report(
            "spider",
            AmbiguityLevel::L2,
            &[ok, broken],
            &verifications,
            10,
        );

        assert!(report.contains("- level: L2"));
        assert!(report.contains("- failed databases: 1"));
        assert!(report.contains("| concert_singer | completed | 42 | 2 | 1 | 1 |"));
        assert!(report.contains("| pets_1 | failed (materialize) | 0 | 0 | - | - |"));
        assert!(report.contains("- pets_1 (materialize): duplicate column name"));
        assert!(report.contains("- concert_singer: `SELECT nm FROM sngr` (timeout)"));
        assert!(report.contains("| IDENTITY | 0 |"));
    }
}
