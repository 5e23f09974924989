use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use schemafog_anonymize::{GeneratedMapping, Operator};
use schemafog_core::{AmbiguityLevel, DatabaseSchema};

/// Summary of one generated mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingMetrics {
    pub level: AmbiguityLevel,
    pub counts: MappingCounts,
    pub operators: BTreeMap<Operator, usize>,
    pub coverage: RewriteCoverage,
    pub warnings: Vec<String>,
}

/// Count summary for the mapped schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingCounts {
    pub tables: usize,
    pub columns: usize,
    pub identifiers: usize,
    pub foreign_keys: usize,
    pub malformed_foreign_keys: usize,
}

/// How much of the schema's vocabulary changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewriteCoverage {
    /// Share of identifiers whose new name differs from the lowercase original.
    pub rewritten_pct: f64,
    /// Share of identifiers assigned an operator other than identity.
    pub non_identity_pct: f64,
    /// Mean of new length over original length.
    pub mean_length_ratio: f64,
}

fn ratio(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64
    } else {
        0.0
    }
}

/// Collect metrics for a mapping generated from `schema`.
pub fn collect_mapping_metrics(
    schema: &DatabaseSchema,
    generated: &GeneratedMapping,
) -> MappingMetrics {
    let mut counts = MappingCounts {
        tables: schema.table_count(),
        columns: schema.column_count(),
        identifiers: generated.map.len(),
        foreign_keys: 0,
        malformed_foreign_keys: 0,
    };
    let mut warnings = Vec::new();

    for (table_name, table) in &schema.tables {
        for descriptor in &table.foreign_keys {
            let Some(fk) = descriptor.well_formed() else {
                counts.malformed_foreign_keys += 1;
                warnings.push(format!("{table_name}: foreign key with a missing field skipped"));
                continue;
            };
            counts.foreign_keys += 1;
            for name in [fk.source_table, fk.source_column, fk.target_column] {
                if !generated.map.contains(name) {
                    warnings.push(format!(
                        "{table_name}: foreign key references unknown identifier '{name}'"
                    ));
                }
            }
        }
    }

    let operators = generated.operator_counts();
    let identity = operators.get(&Operator::Identity).copied().unwrap_or(0);
    let rewritten = generated
        .map
        .iter()
        .filter(|(original, new_name)| original != new_name)
        .count();
    let length_ratios: f64 = generated
        .map
        .iter()
        .map(|(original, new_name)| {
            new_name.chars().count() as f64 / original.chars().count().max(1) as f64
        })
        .sum();

    MappingMetrics {
        level: generated.level,
        coverage: RewriteCoverage {
            rewritten_pct: ratio(rewritten, counts.identifiers),
            non_identity_pct: ratio(counts.identifiers - identity, counts.identifiers),
            mean_length_ratio: if counts.identifiers > 0 {
                length_ratios / counts.identifiers as f64
            } else {
                0.0
            },
        },
        counts,
        operators,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use schemafog_anonymize::generate_mapping;

    use super::*;

    fn schema() -> DatabaseSchema {
        DatabaseSchema::from_json_str(
            &json!({
                "concert": {
                    "columns": [
                        { "name": "concert_ID", "type": "INT", "pk": 1 },
                        { "name": "Stadium_ID", "type": "TEXT" }
                    ],
                    "foreign_keys": [
                        { "sourceTable": "stadium", "sourceColumn": "Stadium_ID", "targetColumn": "Stadium_ID" },
                        { "sourceTable": "stadium", "targetColumn": "Stadium_ID" }
                    ]
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn l0_mapping_rewrites_nothing() {
        let schema = schema();
        let metrics = collect_mapping_metrics(&schema, &generate_mapping(&schema, AmbiguityLevel::L0));

        assert_eq!(metrics.counts.tables, 1);
        assert_eq!(metrics.counts.columns, 2);
        assert_eq!(metrics.counts.identifiers, 3);
        assert_eq!(metrics.counts.foreign_keys, 1);
        assert_eq!(metrics.counts.malformed_foreign_keys, 1);
        assert_eq!(metrics.operators[&Operator::Identity], 3);
        assert_eq!(metrics.coverage.rewritten_pct, 0.0);
        assert_eq!(metrics.coverage.non_identity_pct, 0.0);
        assert!((metrics.coverage.mean_length_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn warns_about_foreign_keys_outside_the_schema() {
        let schema = schema();
        let metrics = collect_mapping_metrics(&schema, &generate_mapping(&schema, AmbiguityLevel::L2));

        assert_eq!(metrics.warnings.len(), 2);
        assert!(metrics.warnings.iter().any(|w| w.contains("'stadium'")));
    }
}
