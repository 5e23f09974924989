use std::path::{Path, PathBuf};

use crate::level::AmbiguityLevel;

/// Output locations for one (dataset, level) pair.
///
/// Every path is a pure function of its inputs, so independent
/// (dataset, level, db_id) runs never share a file.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    mappings_dir: PathBuf,
    datasets_dir: PathBuf,
    dataset: String,
    level: AmbiguityLevel,
}

impl OutputLayout {
    pub fn new(
        mappings_dir: impl Into<PathBuf>,
        datasets_dir: impl Into<PathBuf>,
        dataset: impl Into<String>,
        level: AmbiguityLevel,
    ) -> Self {
        Self {
            mappings_dir: mappings_dir.into(),
            datasets_dir: datasets_dir.into(),
            dataset: dataset.into(),
            level,
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn level(&self) -> AmbiguityLevel {
        self.level
    }

    /// `<dataset>_<level>`, e.g. `spider_L2`.
    pub fn variant_name(&self) -> String {
        format!("{}_{}", self.dataset, self.level)
    }

    pub fn mapping_path(&self, db_id: &str) -> PathBuf {
        self.mappings_dir
            .join(self.variant_name())
            .join(format!("{db_id}.json"))
    }

    pub fn metadata_path(&self, db_id: &str) -> PathBuf {
        self.mappings_dir
            .join(self.variant_name())
            .join(format!("{db_id}.meta.json"))
    }

    pub fn variant_root(&self) -> PathBuf {
        self.datasets_dir.join(self.variant_name())
    }

    pub fn store_path(&self, db_id: &str) -> PathBuf {
        self.variant_root()
            .join("database")
            .join(db_id)
            .join(format!("{db_id}.sqlite"))
    }

    pub fn samples_path(&self) -> PathBuf {
        self.variant_root().join("dev.json")
    }
}

/// Location of an original store: `<database_dir>/<db_id>/<db_id>.sqlite`.
pub fn source_store_path(database_dir: &Path, db_id: &str) -> PathBuf {
    database_dir.join(db_id).join(format!("{db_id}.sqlite"))
}
