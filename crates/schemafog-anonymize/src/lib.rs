//! Deterministic schema anonymization for schemafog.
//!
//! Every table and column name of a database is analyzed, assigned one of a
//! fixed set of transformation operators by a level-dependent policy, and
//! rewritten into a collision-free, keyword-safe identifier map.

pub mod builder;
pub mod feasibility;
pub mod naming;
pub mod operators;
pub mod policy;
pub mod sampler;

pub use builder::{GeneratedMapping, NameMetadata, collect_names, generate_mapping};
pub use feasibility::{Feasibility, feasible_operators};
pub use naming::{CasePattern, NameFeatures, TokenFeatures, analyze_name, tokenize};
pub use operators::{Operator, apply_operator};
pub use policy::{choose_operator, level_weights};
pub use sampler::deterministic_float;
