use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::error::{Result, RewriteError};

/// Parser/serializer pair the rewriter works through.
pub trait SqlCodec {
    /// Parse exactly one statement.
    fn parse(&self, sql: &str) -> Result<Statement>;

    /// Render a statement back to SQL text.
    fn serialize(&self, statement: &Statement) -> Result<String>;
}

/// [`SqlCodec`] for the SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCodec;

impl SqlCodec for SqliteCodec {
    fn parse(&self, sql: &str) -> Result<Statement> {
        let mut statements =
            Parser::parse_sql(&SQLiteDialect {}, sql).map_err(|err| RewriteError::Parse {
                sql: sql.to_string(),
                message: err.to_string(),
            })?;

        match statements.len() {
            1 => Ok(statements.remove(0)),
            0 => Err(RewriteError::Parse {
                sql: sql.to_string(),
                message: "no statement found".to_string(),
            }),
            count => Err(RewriteError::MultipleStatements {
                sql: sql.to_string(),
                count,
            }),
        }
    }

    /// The rendered text is parsed again so a tree that cannot round-trip
    /// is reported here rather than at execution time.
    fn serialize(&self, statement: &Statement) -> Result<String> {
        let sql = statement.to_string();
        Parser::parse_sql(&SQLiteDialect {}, &sql).map_err(|err| RewriteError::Serialization {
            sql: sql.clone(),
            message: err.to_string(),
        })?;
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_statement() {
        let codec = SqliteCodec;
        let statement = codec.parse("SELECT name FROM singer;").unwrap();
        assert_eq!(codec.serialize(&statement).unwrap(), "SELECT name FROM singer");
    }

    #[test]
    fn rejects_multiple_statements() {
        let err = SqliteCodec.parse("SELECT 1; SELECT 2").unwrap_err();
        assert!(matches!(err, RewriteError::MultipleStatements { count: 2, .. }));
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert!(matches!(
            SqliteCodec.parse("").unwrap_err(),
            RewriteError::Parse { .. }
        ));
        let err = SqliteCodec.parse("SELECT * FROM").unwrap_err();
        match err {
            RewriteError::Parse { sql, .. } => assert_eq!(sql, "SELECT * FROM"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
