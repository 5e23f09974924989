use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};

use schemafog_anonymize::generate_mapping;
use schemafog_core::{DatabaseSchema, OutputLayout, source_store_path, validate_schema};
use schemafog_eval::{
    DatabaseReport, DatabaseStatus, SampleVerification, SqliteExecutor, VerificationSummary,
    collect_mapping_metrics, verify_samples,
};
use schemafog_materialize::{MaterializeRequest, Materializer, SqliteMaterializer};
use schemafog_rewrite::{
    AnonymizedSample, BenchmarkSample, SqliteCodec, rewrite_samples, samples_for_db,
};

use crate::config::{Config, DatasetConfig};

/// How far each database is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate and persist the identifier map only.
    MapOnly,
    /// Map, materialize the store, rewrite the samples, optionally verify.
    Full { verify: bool },
}

/// A failure that stops one database; the run moves on to the next one.
#[derive(Debug)]
struct StageError {
    stage: &'static str,
    message: String,
}

fn at<E: Display>(stage: &'static str) -> impl FnOnce(E) -> StageError {
    move |err| StageError {
        stage,
        message: err.to_string(),
    }
}

/// Everything a run produced across its databases.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub databases: Vec<DatabaseReport>,
    pub samples: Vec<AnonymizedSample>,
    pub verifications: Vec<SampleVerification>,
}

/// Drives one (dataset, level) variant over a list of databases.
pub struct Pipeline<'a> {
    config: &'a Config,
    dataset: &'a DatasetConfig,
    layout: OutputLayout,
    mode: Mode,
    materializer: SqliteMaterializer,
    verify_timeout: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        dataset: &'a DatasetConfig,
        layout: OutputLayout,
        mode: Mode,
    ) -> Self {
        Self {
            config,
            dataset,
            layout,
            mode,
            materializer: SqliteMaterializer::default(),
            verify_timeout: config.verify_timeout(),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Process every database in order. Per-database failures are recorded
    /// in the returned reports, never raised.
    pub async fn run(&self, db_ids: &[String], samples: &[BenchmarkSample]) -> PipelineOutput {
        let mut output = PipelineOutput::default();

        for db_id in db_ids {
            let mut report = DatabaseReport::new(db_id.as_str());
            info!(event = "database_started", db_id = %db_id, level = %self.layout.level());

            match self.process(db_id, samples, &mut report).await {
                Ok(processed) => {
                    output.samples.extend(processed.samples);
                    output.verifications.extend(processed.verifications);
                    info!(
                        event = "database_finished",
                        db_id = %db_id,
                        rows = report.rows_copied,
                        samples = report.samples_rewritten
                    );
                }
                Err(err) => {
                    error!(
                        event = "database_failed",
                        db_id = %db_id,
                        stage = err.stage,
                        error = %err.message
                    );
                    report.status = DatabaseStatus::Failed {
                        stage: err.stage.to_string(),
                        error: err.message,
                    };
                }
            }
            output.databases.push(report);
        }

        output
    }

    async fn process(
        &self,
        db_id: &str,
        samples: &[BenchmarkSample],
        report: &mut DatabaseReport,
    ) -> Result<Processed, StageError> {
        let schema_path = self.config.schema_path(self.layout.dataset(), db_id);
        let schema = DatabaseSchema::load(&schema_path).map_err(at("schema"))?;
        validate_schema(&schema).map_err(at("schema"))?;

        let generated = generate_mapping(&schema, self.layout.level());
        generated
            .save(
                &self.layout.mapping_path(db_id),
                &self.layout.metadata_path(db_id),
            )
            .map_err(at("mapping"))?;

        let metrics = collect_mapping_metrics(&schema, &generated);
        for warning in &metrics.warnings {
            warn!(event = "mapping_warning", db_id = %db_id, warning = %warning);
        }
        report.metrics = Some(metrics);

        let Mode::Full { verify } = self.mode else {
            return Ok(Processed::default());
        };

        let source_path = source_store_path(&self.dataset.database_dir, db_id);
        let store_path = self.layout.store_path(db_id);
        let request = MaterializeRequest {
            db_id,
            schema: &schema,
            map: &generated.map,
            source_path: &source_path,
            store_path: &store_path,
        };
        let copied = self
            .materializer
            .materialize(&request)
            .await
            .map_err(at("materialize"))?;
        report.rows_copied = copied.total_rows();

        let rewritten = rewrite_samples(
            &SqliteCodec,
            samples_for_db(samples, db_id),
            &generated.map,
        )
        .map_err(at("rewrite"))?;
        report.samples_rewritten = rewritten.len();

        let verifications = if verify {
            let results = self.verify(&store_path, &rewritten).await?;
            report.verification = Some(VerificationSummary::from_results(&results));
            results
        } else {
            Vec::new()
        };

        Ok(Processed {
            samples: rewritten,
            verifications,
        })
    }

    async fn verify(
        &self,
        store_path: &Path,
        samples: &[AnonymizedSample],
    ) -> Result<Vec<SampleVerification>, StageError> {
        let executor = SqliteExecutor::open(store_path)
            .await
            .map_err(at("verify"))?;
        Ok(verify_samples(&executor, samples, self.verify_timeout).await)
    }
}

#[derive(Debug, Default)]
struct Processed {
    samples: Vec<AnonymizedSample>,
    verifications: Vec<SampleVerification>,
}

#[cfg(test)]
mod tests {
    use schemafog_core::AmbiguityLevel;

    use super::*;

    const SCHEMA: &str = r#"{
        "singer": {
            "columns": [
                {"name": "Singer_ID", "type": "int", "pk": 1},
                {"name": "Name", "type": "text"}
            ],
            "primary_keys": ["Singer_ID"]
        }
    }"#;

    fn test_config(root: &Path) -> Config {
        let mut config = Config {
            schemas_dir: root.join("schemas"),
            mappings_dir: root.join("mappings"),
            datasets_dir: root.join("datasets"),
            ..Config::default()
        };
        config.datasets.insert(
            "toy".to_string(),
            DatasetConfig {
                database_dir: root.join("stores"),
                samples_path: root.join("dev.json"),
            },
        );
        std::fs::create_dir_all(root.join("schemas/toy")).unwrap();
        std::fs::write(root.join("schemas/toy/singers.json"), SCHEMA).unwrap();
        config
    }

    #[tokio::test]
    async fn map_only_persists_mapping_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let dataset = config.dataset("toy").unwrap();
        let pipeline = Pipeline::new(
            &config,
            dataset,
            config.layout("toy", AmbiguityLevel::L1),
            Mode::MapOnly,
        );

        let output = pipeline.run(&["singers".to_string()], &[]).await;

        assert_eq!(output.databases.len(), 1);
        assert!(!output.databases[0].failed());
        let metrics = output.databases[0].metrics.as_ref().unwrap();
        assert_eq!(metrics.counts.identifiers, 3);
        assert!(
            dir.path()
                .join("mappings/toy_L1/singers.json")
                .exists()
        );
        assert!(
            dir.path()
                .join("mappings/toy_L1/singers.meta.json")
                .exists()
        );
    }

    #[tokio::test]
    async fn failing_database_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let dataset = config.dataset("toy").unwrap();
        let pipeline = Pipeline::new(
            &config,
            dataset,
            config.layout("toy", AmbiguityLevel::L2),
            Mode::Full { verify: false },
        );

        let db_ids = ["missing_schema".to_string(), "singers".to_string()];
        let output = pipeline.run(&db_ids, &[]).await;

        let stages: Vec<Option<&str>> = output
            .databases
            .iter()
            .map(|db| match &db.status {
                DatabaseStatus::Failed { stage, .. } => Some(stage.as_str()),
                DatabaseStatus::Completed => None,
            })
            .collect();
        // The second database has no source store to copy from.
        assert_eq!(stages, vec![Some("schema"), Some("materialize")]);
        assert!(output.samples.is_empty());
        assert!(
            dir.path()
                .join("mappings/toy_L2/singers.json")
                .exists()
        );
    }
}
