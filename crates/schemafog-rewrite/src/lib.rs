//! Applies an identifier map to benchmark SQL at the syntax-tree level.

pub mod codec;
pub mod error;
pub mod rewriter;
pub mod samples;

pub use codec::{SqlCodec, SqliteCodec};
pub use error::{Result, RewriteError};
pub use rewriter::{IdentifierRewriter, rewrite_statement, translate_sql};
pub use samples::{
    AnonymizedSample, BenchmarkSample, load_samples, rewrite_samples, samples_for_db,
    save_samples,
};
