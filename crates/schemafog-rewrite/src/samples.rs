use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use schemafog_core::{IdentifierMap, to_json_pretty, write_file};

use crate::codec::SqlCodec;
use crate::error::{Result, RewriteError};
use crate::rewriter::translate_sql;

/// A benchmark question with its gold SQL, as shipped by the dataset.
///
/// BIRD stores the query under `SQL`; Spider and KaggleDBQA use `query`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BenchmarkSample {
    pub db_id: String,
    pub question: String,
    #[serde(rename = "SQL", default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl BenchmarkSample {
    /// The gold SQL, preferring `SQL` over `query`; empty strings count as absent.
    pub fn gold_sql(&self) -> Option<&str> {
        [self.sql.as_deref(), self.query.as_deref()]
            .into_iter()
            .flatten()
            .find(|sql| !sql.trim().is_empty())
    }
}

/// A sample after its gold SQL was rewritten; the question is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizedSample {
    pub db_id: String,
    pub question: String,
    pub query: String,
}

pub fn load_samples(path: &Path) -> Result<Vec<BenchmarkSample>> {
    let content = std::fs::read_to_string(path).map_err(schemafog_core::Error::from)?;
    Ok(serde_json::from_str(&content).map_err(schemafog_core::Error::from)?)
}

/// Samples that belong to `db_id`, in file order.
pub fn samples_for_db<'a>(
    samples: &'a [BenchmarkSample],
    db_id: &'a str,
) -> impl Iterator<Item = &'a BenchmarkSample> + 'a {
    samples.iter().filter(move |sample| sample.db_id == db_id)
}

/// Rewrite one database's samples.
///
/// Any failing sample fails the whole set; the error carries the offending SQL.
pub fn rewrite_samples<'a>(
    codec: &impl SqlCodec,
    samples: impl IntoIterator<Item = &'a BenchmarkSample>,
    map: &IdentifierMap,
) -> Result<Vec<AnonymizedSample>> {
    let mut rewritten = Vec::new();
    for sample in samples {
        let sql = sample
            .gold_sql()
            .ok_or_else(|| RewriteError::InvalidSample {
                db_id: sample.db_id.clone(),
                message: format!("no gold SQL for question '{}'", sample.question),
            })?;

        let query = translate_sql(codec, sql, map).inspect_err(|err| {
            warn!(db_id = %sample.db_id, error = %err, "sample rewrite failed");
        })?;
        rewritten.push(AnonymizedSample {
            db_id: sample.db_id.clone(),
            question: sample.question.clone(),
            query,
        });
    }
    Ok(rewritten)
}

/// Write the rewritten sample list as a 4-space indented JSON array.
pub fn save_samples(path: &Path, samples: &[AnonymizedSample]) -> Result<()> {
    write_file(path, &to_json_pretty(samples)?)?;
    info!(path = %path.display(), samples = samples.len(), "samples saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SqliteCodec;

    fn sample(sql: Option<&str>, query: Option<&str>) -> BenchmarkSample {
        BenchmarkSample {
            db_id: "concert_singer".to_string(),
            question: "How many singers do we have?".to_string(),
            sql: sql.map(str::to_string),
            query: query.map(str::to_string),
        }
    }

    #[test]
    fn gold_sql_prefers_sql_field() {
        assert_eq!(sample(Some("SELECT 1"), Some("SELECT 2")).gold_sql(), Some("SELECT 1"));
        assert_eq!(sample(Some(""), Some("SELECT 2")).gold_sql(), Some("SELECT 2"));
        assert_eq!(sample(None, None).gold_sql(), None);
    }

    #[test]
    fn parses_both_dataset_shapes() {
        let samples: Vec<BenchmarkSample> = serde_json::from_str(
            r#"[
                {"db_id": "a", "question": "q1", "query": "SELECT 1", "query_toks": ["SELECT", "1"]},
                {"db_id": "b", "question": "q2", "SQL": "SELECT 2", "evidence": ""}
            ]"#,
        )
        .unwrap();
        assert_eq!(samples[0].gold_sql(), Some("SELECT 1"));
        assert_eq!(samples[1].gold_sql(), Some("SELECT 2"));
    }

    #[test]
    fn missing_sql_is_an_invalid_sample() {
        let samples = [sample(None, None)];
        let err = rewrite_samples(&SqliteCodec, &samples, &IdentifierMap::new()).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidSample { .. }));
    }

    #[test]
    fn rewrites_query_and_keeps_question() {
        let samples = [sample(None, Some("SELECT count(*) FROM singer"))];
        let map = IdentifierMap::from_iter([("singer".to_string(), "sngr".to_string())]);
        let rewritten = rewrite_samples(&SqliteCodec, &samples, &map).unwrap();

        assert_eq!(
            rewritten,
            vec![AnonymizedSample {
                db_id: "concert_singer".to_string(),
                question: "How many singers do we have?".to_string(),
                query: "SELECT count(*) FROM sngr".to_string(),
            }]
        );
    }
}
