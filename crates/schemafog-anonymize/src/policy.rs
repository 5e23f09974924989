use schemafog_core::AmbiguityLevel;

use crate::feasibility::{Feasibility, feasible_operators};
use crate::naming::NameFeatures;
use crate::operators::Operator;
use crate::sampler::deterministic_float;

/// Operator weights in [`Operator::CANONICAL_ORDER`]; each row sums to 1.
///
/// Identity weight falls and destructive weights rise with the level.
pub fn level_weights(level: AmbiguityLevel) -> [f64; 5] {
    match level {
        AmbiguityLevel::L0 => [1.0, 0.0, 0.0, 0.0, 0.0],
        AmbiguityLevel::L1 => [0.55, 0.10, 0.00, 0.25, 0.10],
        AmbiguityLevel::L2 => [0.20, 0.30, 0.15, 0.20, 0.15],
        AmbiguityLevel::L3 => [0.05, 0.40, 0.25, 0.10, 0.20],
    }
}

/// Deterministically choose one operator for `nf` at `level`.
///
/// The draw is keyed only on the lowercase name and the level, so the same
/// identifier text gets the same operator in every database.
pub fn choose_operator(level: AmbiguityLevel, nf: &NameFeatures) -> Operator {
    if level == AmbiguityLevel::L0 {
        return Operator::Identity;
    }

    let feasible = feasible_operators(nf);
    let draw = deterministic_float(&[&nf.normalized_name, &level]);
    select(&masked_weights(level, &feasible), draw)
}

/// Base weights with infeasible non-identity operators zeroed.
fn masked_weights(level: AmbiguityLevel, feasible: &Feasibility) -> [f64; 5] {
    let mut weights = level_weights(level);
    for (weight, operator) in weights.iter_mut().zip(Operator::CANONICAL_ORDER) {
        if !feasible.allows(operator) {
            *weight = 0.0;
        }
    }
    weights
}

/// Inverse-CDF selection over renormalized weights.
fn select(weights: &[f64; 5], draw: f64) -> Operator {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Operator::Identity;
    }

    let mut cumulative = 0.0;
    for (weight, operator) in weights.iter().zip(Operator::CANONICAL_ORDER) {
        cumulative += weight / total;
        if *weight > 0.0 && draw <= cumulative {
            return operator;
        }
    }

    // Rounding left the draw above the last cumulative sum.
    weights
        .iter()
        .zip(Operator::CANONICAL_ORDER)
        .rev()
        .find(|(weight, _)| **weight > 0.0)
        .map(|(_, operator)| operator)
        .unwrap_or(Operator::Identity)
}
