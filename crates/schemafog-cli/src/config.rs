use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use schemafog_core::{AmbiguityLevel, Error as CoreError, OutputLayout};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "schemafog.toml";

/// Where one benchmark keeps its stores and its gold samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub database_dir: PathBuf,
    pub samples_path: PathBuf,
}

/// Contents of `schemafog.toml`; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schemas_dir: PathBuf,
    pub mappings_dir: PathBuf,
    pub datasets_dir: PathBuf,
    pub verify_timeout_secs: u64,
    pub datasets: BTreeMap<String, DatasetConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let datasets = [
            (
                "spider",
                "data/datasets/spider/database",
                "data/datasets/spider/dev.json",
            ),
            (
                "bird",
                "data/datasets/bird/dev/database",
                "data/datasets/bird/dev/dev.json",
            ),
            (
                "kaggledbqa",
                "data/datasets/kaggledbqa/database",
                "data/datasets/kaggledbqa/dev.json",
            ),
        ]
        .into_iter()
        .map(|(name, database_dir, samples_path)| {
            (
                name.to_string(),
                DatasetConfig {
                    database_dir: PathBuf::from(database_dir),
                    samples_path: PathBuf::from(samples_path),
                },
            )
        })
        .collect();

        Self {
            schemas_dir: PathBuf::from("data/schemas"),
            mappings_dir: PathBuf::from("data/mappings"),
            datasets_dir: PathBuf::from("data/datasets"),
            verify_timeout_secs: 30,
            datasets,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        let config: Config = toml::from_str(input)
            .map_err(|err| CoreError::Configuration(format!("invalid config file: {err}")))?;
        if config.verify_timeout_secs == 0 {
            return Err(CoreError::Configuration(
                "verify_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load `path`; a missing default file falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|err| {
            CoreError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn dataset(&self, name: &str) -> Result<&DatasetConfig, CoreError> {
        self.datasets.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.datasets.keys().map(String::as_str).collect();
            CoreError::Configuration(format!(
                "unknown dataset: {name} (known: {})",
                known.join(", ")
            ))
        })
    }

    /// `<schemas_dir>/<dataset>/<db_id>.json`.
    pub fn schema_path(&self, dataset: &str, db_id: &str) -> PathBuf {
        self.schemas_dir.join(dataset).join(format!("{db_id}.json"))
    }

    pub fn layout(&self, dataset: &str, level: AmbiguityLevel) -> OutputLayout {
        OutputLayout::new(&self.mappings_dir, &self.datasets_dir, dataset, level)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    /// Every database with a schema description for `dataset`, sorted.
    pub fn discover_db_ids(&self, dataset: &str) -> Result<Vec<String>, CoreError> {
        let dir = self.schemas_dir.join(dataset);
        let entries = std::fs::read_dir(&dir).map_err(|err| {
            CoreError::Configuration(format!("cannot list {}: {err}", dir.display()))
        })?;

        let mut db_ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                db_ids.push(stem.to_string());
            }
        }
        db_ids.sort();
        Ok(db_ids)
    }
}
