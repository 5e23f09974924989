use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::json;

use schemafog_anonymize::{Operator, analyze_name, feasible_operators, generate_mapping};
use schemafog_core::{AmbiguityLevel, DatabaseSchema, is_reserved_keyword};

fn concert_singer() -> DatabaseSchema {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../schemafog-core/tests/fixtures/concert_singer.schema.json");
    DatabaseSchema::load(&path).expect("load concert_singer schema")
}

/// A single wide table whose column names are mostly multi-token words.
fn wide_schema() -> DatabaseSchema {
    let heads = [
        "customer", "order", "product", "employee", "student", "instructor", "country", "station",
        "airport", "account", "vendor", "invoice", "payment", "shipment", "warehouse",
        "department", "project", "course", "stadium", "singer",
    ];
    let tails = [
        "Name", "Address", "Number", "Status", "Category", "Description", "Amount", "Created",
        "Region", "Balance",
    ];

    let columns: Vec<_> = heads
        .iter()
        .flat_map(|head| tails.iter().map(move |tail| format!("{head}{tail}")))
        .map(|name| json!({ "name": name, "type": "TEXT", "notnull": 0, "pk": 0 }))
        .collect();

    DatabaseSchema::from_json_str(&json!({ "records": { "columns": columns } }).to_string())
        .expect("wide schema")
}

fn all_names(schema: &DatabaseSchema) -> Vec<String> {
    schema
        .tables
        .iter()
        .flat_map(|(table, def)| {
            std::iter::once(table.clone()).chain(def.columns.iter().map(|c| c.name.clone()))
        })
        .collect()
}

#[test]
fn mapping_covers_every_identifier() {
    let schema = concert_singer();
    for level in AmbiguityLevel::ALL {
        let generated = generate_mapping(&schema, level);
        for name in all_names(&schema) {
            assert!(generated.map.contains(&name), "{name} missing at {level}");
        }
        assert_eq!(generated.map.len(), generated.metadata.len());
    }
}

#[test]
fn mapping_is_injective_and_keyword_safe() {
    for schema in [concert_singer(), wide_schema()] {
        for level in AmbiguityLevel::ALL {
            let generated = generate_mapping(&schema, level);
            let mut seen = HashSet::new();
            for (original, new_name) in generated.map.iter() {
                assert!(
                    seen.insert(new_name.to_lowercase()),
                    "{original} reuses {new_name} at {level}"
                );
                assert!(!is_reserved_keyword(new_name), "{new_name} at {level}");
                assert!(!new_name.is_empty());
            }
        }
    }
}

#[test]
fn mapping_is_deterministic() {
    let schema = concert_singer();
    for level in AmbiguityLevel::ALL {
        assert_eq!(generate_mapping(&schema, level), generate_mapping(&schema, level));
    }
}

#[test]
fn level_zero_is_identity_for_plain_names() {
    let generated = generate_mapping(&concert_singer(), AmbiguityLevel::L0);
    for (original, new_name) in generated.map.iter() {
        assert_eq!(original, new_name);
    }
    assert_eq!(generated.operator_counts()[&Operator::Identity], generated.map.len());
}

#[test]
fn level_zero_prefixes_keywords_only() {
    let generated = generate_mapping(&wide_schema(), AmbiguityLevel::L0);
    assert_eq!(generated.map.lookup("orderName"), Some("ordername"));
    assert_eq!(generated.map.lookup("records"), Some("records"));
}

#[test]
fn rewritten_share_grows_with_level() {
    let schema = wide_schema();
    let shares: Vec<f64> = AmbiguityLevel::ALL
        .iter()
        .map(|level| {
            let generated = generate_mapping(&schema, *level);
            let counts = generated.operator_counts();
            let rewritten = generated.map.len() - counts[&Operator::Identity];
            rewritten as f64 / generated.map.len() as f64
        })
        .collect();

    assert_eq!(shares[0], 0.0);
    assert!(
        shares.windows(2).all(|pair| pair[0] <= pair[1]),
        "shares not monotone: {shares:?}"
    );
    assert!(shares[3] > shares[1]);
}

#[test]
fn customer_id_analysis_at_l1() {
    let nf = analyze_name("CustomerID");
    let tokens: Vec<&str> = nf.tokens.iter().map(|t| t.original.as_str()).collect();
    assert_eq!(tokens, vec!["Customer", "ID"]);

    let feasible = feasible_operators(&nf);
    assert!(feasible.abbrev);
    assert!(feasible.vowel_drop);

    let schema = DatabaseSchema::from_json_str(
        &json!({
            "Customers": { "columns": [
                { "name": "CustomerID", "type": "INTEGER", "notnull": 1, "pk": 1 }
            ] }
        })
        .to_string(),
    )
    .expect("schema");
    let generated = generate_mapping(&schema, AmbiguityLevel::L1);
    let new_name = generated.map.lookup("CustomerID").expect("mapped");
    assert_eq!(new_name, new_name.to_lowercase());
}

#[test]
fn id_survives_letter_operators() {
    let schema = DatabaseSchema::from_json_str(
        &json!({ "t": { "columns": [{ "name": "id", "type": "INT" }] } }).to_string(),
    )
    .expect("schema");

    for level in AmbiguityLevel::ALL {
        let generated = generate_mapping(&schema, level);
        let entry = &generated.metadata["id"];
        assert!(
            matches!(entry.operator, Operator::Identity | Operator::NoiseWrap),
            "id chose {} at {level}",
            entry.operator
        );
        assert!(generated.map.lookup("id").expect("mapped").contains("id"));
    }
}
