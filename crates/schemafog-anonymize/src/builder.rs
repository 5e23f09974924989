//! Builds the per-database identifier map.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use schemafog_core::{
    AmbiguityLevel, DatabaseSchema, IdentifierMap, KEYWORD_PREFIX, Result, is_reserved_keyword,
    to_json_pretty, write_file,
};

use crate::naming::{CasePattern, analyze_name};
use crate::operators::{Operator, apply_operator};
use crate::policy::choose_operator;

/// Diagnostic record of how one identifier was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMetadata {
    pub operator: Operator,
    pub original: String,
    /// Token literals in their original case, e.g. `["Customer", "ID"]`.
    pub tokens: Vec<String>,
    pub case_pattern: CasePattern,
}

/// Output of [`generate_mapping`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMapping {
    pub level: AmbiguityLevel,
    pub map: IdentifierMap,
    /// New identifier to lowercase original name.
    pub reverse: BTreeMap<String, String>,
    /// Keyed by lowercase original name.
    pub metadata: BTreeMap<String, NameMetadata>,
}

impl GeneratedMapping {
    /// Number of names rewritten by each operator, in canonical order.
    pub fn operator_counts(&self) -> BTreeMap<Operator, usize> {
        let mut counts: BTreeMap<Operator, usize> = Operator::CANONICAL_ORDER
            .into_iter()
            .map(|operator| (operator, 0))
            .collect();
        for entry in self.metadata.values() {
            *counts.entry(entry.operator).or_default() += 1;
        }
        counts
    }

    /// Persist the forward map and the metadata sidecar.
    pub fn save(&self, mapping_path: &Path, metadata_path: &Path) -> Result<()> {
        self.map.save(mapping_path)?;
        write_file(metadata_path, &to_json_pretty(&self.metadata)?)?;
        info!(
            path = %mapping_path.display(),
            entries = self.map.len(),
            "mapping saved"
        );
        Ok(())
    }
}

/// Every table and column name, deduplicated case-insensitively and sorted
/// by lowercase form.
///
/// Among case variants of one name, the lexicographically smallest spelling
/// is kept as the representative.
pub fn collect_names(schema: &DatabaseSchema) -> Vec<String> {
    let mut names: BTreeMap<String, String> = BTreeMap::new();
    let all = schema.tables.iter().flat_map(|(table_name, table)| {
        std::iter::once(table_name.as_str())
            .chain(table.columns.iter().map(|column| column.name.as_str()))
    });

    for name in all {
        names
            .entry(name.to_lowercase())
            .and_modify(|current| {
                if name < current.as_str() {
                    *current = name.to_string();
                }
            })
            .or_insert_with(|| name.to_string());
    }

    names.into_values().collect()
}

/// Generate the identifier map for one database at one level.
///
/// Values are unique and never a reserved keyword. The result depends only
/// on the set of names and the level.
pub fn generate_mapping(schema: &DatabaseSchema, level: AmbiguityLevel) -> GeneratedMapping {
    let names = collect_names(schema);
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut forward: Vec<(String, String)> = Vec::with_capacity(names.len());
    let mut reverse = BTreeMap::new();
    let mut metadata = BTreeMap::new();

    for original in &names {
        let nf = analyze_name(original);
        let operator = choose_operator(level, &nf);
        let candidate = apply_operator(operator, &nf, level);
        let new_name = resolve_candidate(candidate, &used);

        debug!(
            original = %original,
            operator = %operator,
            new_name = %new_name,
            "identifier mapped"
        );

        used.insert(new_name.to_lowercase());
        reverse.insert(new_name.clone(), nf.normalized_name.clone());
        metadata.insert(
            nf.normalized_name.clone(),
            NameMetadata {
                operator,
                original: original.clone(),
                tokens: nf.tokens.iter().map(|token| token.original.clone()).collect(),
                case_pattern: nf.case_pattern,
            },
        );
        forward.push((nf.normalized_name, new_name));
    }

    info!(level = %level, names = names.len(), "mapping generated");

    GeneratedMapping {
        level,
        map: forward.into_iter().collect(),
        reverse,
        metadata,
    }
}

/// Make `candidate` unique and keyword-safe against the values already issued.
fn resolve_candidate(mut candidate: String, used: &HashSet<String>) -> String {
    loop {
        let unique = dedupe(candidate, used);
        if !is_reserved_keyword(&unique) {
            return unique;
        }
        candidate = format!("{KEYWORD_PREFIX}{unique}");
    }
}

fn dedupe(candidate: String, used: &HashSet<String>) -> String {
    if !used.contains(&candidate.to_lowercase()) {
        return candidate;
    }

    let mut n = 1;
    loop {
        let attempt = format!("{candidate}_{n}");
        if !used.contains(&attempt.to_lowercase()) {
            return attempt;
        }
        n += 1;
    }
}
