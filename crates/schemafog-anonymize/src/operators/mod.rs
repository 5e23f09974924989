//! Name transformation operators.
//!
//! Every operator is a pure function of the analyzed name and the level.

mod abbreviations;

use std::fmt;

use serde::{Deserialize, Serialize};

use schemafog_core::AmbiguityLevel;

use crate::naming::{NameFeatures, TokenFeatures};
use crate::sampler::deterministic_float;

pub use abbreviations::common_abbreviation;

/// One of the five fixed name transformation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Identity,
    Abbrev,
    VowelDrop,
    CaseFlatten,
    NoiseWrap,
}

impl Operator {
    /// Order used by the policy's inverse-CDF selection.
    pub const CANONICAL_ORDER: [Operator; 5] = [
        Operator::Identity,
        Operator::Abbrev,
        Operator::VowelDrop,
        Operator::CaseFlatten,
        Operator::NoiseWrap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Identity => "IDENTITY",
            Operator::Abbrev => "ABBREV",
            Operator::VowelDrop => "VOWEL_DROP",
            Operator::CaseFlatten => "CASE_FLATTEN",
            Operator::NoiseWrap => "NOISE_WRAP",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply `operator` to an analyzed name.
///
/// Total for any non-empty name: a token-based result that comes out empty
/// falls back to the normalized name.
pub fn apply_operator(operator: Operator, nf: &NameFeatures, level: AmbiguityLevel) -> String {
    let candidate = match operator {
        Operator::Identity => return nf.normalized_name.clone(),
        Operator::Abbrev => abbrev(nf),
        Operator::VowelDrop => vowel_drop(nf),
        Operator::CaseFlatten => case_flatten(nf, level),
        Operator::NoiseWrap => noise_wrap(nf, level),
    };

    if candidate.is_empty() {
        nf.normalized_name.clone()
    } else {
        candidate
    }
}

fn abbrev(nf: &NameFeatures) -> String {
    join_tokens(nf, |token| {
        if token.is_numeric || token.looks_like_id || token.is_abbreviation {
            return token.token.clone();
        }
        if let Some(short) = common_abbreviation(&token.token) {
            return short.to_string();
        }

        let keep = match token.length {
            len if len >= 8 => 4,
            len if len >= 4 => 3,
            _ => return token.token.clone(),
        };
        token.token.chars().take(keep).collect()
    })
}

fn vowel_drop(nf: &NameFeatures) -> String {
    join_tokens(nf, |token| {
        if token.is_numeric || token.looks_like_id || token.is_abbreviation || token.is_all_caps
        {
            return token.token.clone();
        }

        let mut chars = token.token.chars();
        let Some(first) = chars.next() else {
            return String::new();
        };
        let tail: Vec<char> = chars.collect();
        let mut rest: Vec<char> = tail.iter().copied().filter(|ch| !is_vowel(*ch)).collect();

        // Keep at least two characters after the first by restoring one vowel.
        if rest.len() < 2
            && let Some(vowel) = tail.iter().copied().find(|ch| is_vowel(*ch))
        {
            rest.push(vowel);
        }

        std::iter::once(first).chain(rest).collect()
    })
}

fn case_flatten(nf: &NameFeatures, level: AmbiguityLevel) -> String {
    let snake = nf.joined_tokens("_");
    match level {
        AmbiguityLevel::L3 => snake.replace('_', ""),
        AmbiguityLevel::L0 | AmbiguityLevel::L1 | AmbiguityLevel::L2 => snake,
    }
}

fn noise_wrap(nf: &NameFeatures, level: AmbiguityLevel) -> String {
    let base = nf.joined_tokens("_");
    let Some((prefixes, suffixes)) = noise_vocabulary(level) else {
        return nf.normalized_name.clone();
    };

    let key = nf.normalized_name.as_str();
    let prefix = pick(prefixes, deterministic_float(&[&key, &level, &"prefix"]));
    let suffix = pick(suffixes, deterministic_float(&[&key, &level, &"suffix"]));
    let mode = deterministic_float(&[&key, &level, &"mode"]);

    if mode < 1.0 / 3.0 {
        format!("{prefix}{base}")
    } else if mode < 2.0 / 3.0 {
        format!("{base}{suffix}")
    } else {
        format!("{prefix}{base}{suffix}")
    }
}

const L1_PREFIXES: &[&str] = &["tbl_", "t_", "u_", "dim_", "d_", "f_"];
const L1_SUFFIXES: &[&str] = &["_tbl", "_t", "_col", "_fld", "_01", "_x"];
const L2_PREFIXES: &[&str] = &["vx_", "kzr_", "mpr_", "qlt_", "zhn_"];
const L2_SUFFIXES: &[&str] = &["_vx", "_kz", "_mpr", "_ql", "_zhn"];
const L3_PREFIXES: &[&str] = &["xq7_", "ztr9_", "pqm4_", "vsk8_", "kxh3_"];
const L3_SUFFIXES: &[&str] = &["_xq7", "_z9", "_p4m", "_v8k", "_k3h"];

/// Prefix and suffix vocabularies; `L0` has none.
pub fn noise_vocabulary(
    level: AmbiguityLevel,
) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match level {
        AmbiguityLevel::L0 => None,
        AmbiguityLevel::L1 => Some((L1_PREFIXES, L1_SUFFIXES)),
        AmbiguityLevel::L2 => Some((L2_PREFIXES, L2_SUFFIXES)),
        AmbiguityLevel::L3 => Some((L3_PREFIXES, L3_SUFFIXES)),
    }
}

fn pick(options: &'static [&'static str], draw: f64) -> &'static str {
    let index = ((draw * options.len() as f64) as usize).min(options.len() - 1);
    options[index]
}

fn join_tokens(nf: &NameFeatures, rewrite: impl Fn(&TokenFeatures) -> String) -> String {
    nf.tokens
        .iter()
        .map(rewrite)
        .collect::<Vec<_>>()
        .join("_")
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}
