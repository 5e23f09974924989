//! Identifier substitution over a parsed statement.

use std::ops::ControlFlow;

use sqlparser::ast::{
    Expr, Ident, JoinConstraint, JoinOperator, ObjectName, ObjectNamePart, Query, SelectItem,
    SelectItemQualifiedWildcardKind, SetExpr, Statement, TableAlias, TableFactor, TableWithJoins,
    VisitMut, VisitorMut,
};
use tracing::debug;

use schemafog_core::IdentifierMap;

use crate::codec::SqlCodec;
use crate::error::Result;

/// Renames every identifier that has a mapping entry, in place.
///
/// Covered: table references (last name part), column references and each of
/// their qualifier parts, `JOIN ... USING` columns, table and subquery aliases
/// with their column lists, select-item aliases, CTE names, and qualified
/// wildcards. Identifiers without an entry are left
/// as they are; quote style is preserved.
pub struct IdentifierRewriter<'a> {
    map: &'a IdentifierMap,
    renamed: usize,
}

impl<'a> IdentifierRewriter<'a> {
    pub fn new(map: &'a IdentifierMap) -> Self {
        Self { map, renamed: 0 }
    }

    /// Number of identifiers replaced so far.
    pub fn renamed(&self) -> usize {
        self.renamed
    }

    fn rename(&mut self, ident: &mut Ident) {
        if let Some(new_name) = self.map.lookup(&ident.value) {
            ident.value = new_name.to_string();
            self.renamed += 1;
        }
    }

    fn rename_last_part(&mut self, name: &mut ObjectName) {
        if let Some(ObjectNamePart::Identifier(ident)) = name.0.last_mut() {
            self.rename(ident);
        }
    }

    fn rename_alias(&mut self, alias: &mut TableAlias) {
        self.rename(&mut alias.name);
        for column in &mut alias.columns {
            self.rename(&mut column.name);
        }
    }

    fn rename_join_columns(&mut self, table: &mut TableWithJoins) {
        for join in &mut table.joins {
            if let Some(JoinConstraint::Using(columns)) = join_constraint(&mut join.join_operator) {
                for column in columns {
                    self.rename_last_part(column);
                }
            }
        }
    }

    fn rename_select_items(&mut self, body: &mut SetExpr) {
        match body {
            SetExpr::Select(select) => {
                for table in &mut select.from {
                    self.rename_join_columns(table);
                }
                for item in &mut select.projection {
                    match item {
                        SelectItem::ExprWithAlias { alias, .. } => self.rename(alias),
                        SelectItem::QualifiedWildcard(
                            SelectItemQualifiedWildcardKind::ObjectName(name),
                            _,
                        ) => self.rename_last_part(name),
                        _ => {}
                    }
                }
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.rename_select_items(left);
                self.rename_select_items(right);
            }
            _ => {}
        }
    }
}

impl VisitorMut for IdentifierRewriter<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &mut query.with {
            for cte in &mut with.cte_tables {
                self.rename_alias(&mut cte.alias);
            }
        }
        self.rename_select_items(&mut query.body);
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &mut ObjectName) -> ControlFlow<Self::Break> {
        self.rename_last_part(relation);
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(
        &mut self,
        table_factor: &mut TableFactor,
    ) -> ControlFlow<Self::Break> {
        match table_factor {
            TableFactor::Table {
                alias: Some(alias), ..
            }
            | TableFactor::Derived {
                alias: Some(alias), ..
            } => self.rename_alias(alias),
            TableFactor::NestedJoin {
                table_with_joins,
                alias,
            } => {
                self.rename_join_columns(table_with_joins);
                if let Some(alias) = alias {
                    self.rename_alias(alias);
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match expr {
            Expr::Identifier(ident) => self.rename(ident),
            Expr::CompoundIdentifier(parts) => {
                for ident in parts {
                    self.rename(ident);
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

fn join_constraint(operator: &mut JoinOperator) -> Option<&mut JoinConstraint> {
    match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint)
        | JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

/// Rewrite a parsed statement in place; returns how many identifiers changed.
pub fn rewrite_statement(statement: &mut Statement, map: &IdentifierMap) -> usize {
    let mut rewriter = IdentifierRewriter::new(map);
    let _ = statement.visit(&mut rewriter);
    rewriter.renamed()
}

/// Parse `sql`, substitute identifiers, and serialize the result.
pub fn translate_sql(codec: &impl SqlCodec, sql: &str, map: &IdentifierMap) -> Result<String> {
    let mut statement = codec.parse(sql)?;
    let renamed = rewrite_statement(&mut statement, map);
    let rewritten = codec.serialize(&statement)?;
    debug!(renamed, sql = %rewritten, "query rewritten");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SqliteCodec;

    fn map(entries: &[(&str, &str)]) -> IdentifierMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn translate(sql: &str, entries: &[(&str, &str)]) -> String {
        translate_sql(&SqliteCodec, sql, &map(entries)).unwrap()
    }

    #[test]
    fn renames_tables_and_columns_case_insensitively() {
        let sql = translate(
            "SELECT CustomerID FROM Customers",
            &[("customerid", "cust_id"), ("customers", "vx_cust")],
        );
        assert_eq!(sql, "SELECT cust_id FROM vx_cust");
    }

    #[test]
    fn renames_qualifiers_and_aliases() {
        let sql = translate(
            "SELECT T1.name FROM singer AS T1 JOIN singer_in_concert AS T2 ON T1.singer_id = T2.singer_id",
            &[
                ("singer", "sngr"),
                ("singer_in_concert", "sic"),
                ("name", "nm"),
                ("singer_id", "sngr_id"),
            ],
        );
        assert_eq!(
            sql,
            "SELECT T1.nm FROM sngr AS T1 JOIN sic AS T2 ON T1.sngr_id = T2.sngr_id"
        );
    }

    #[test]
    fn qualifier_matching_a_table_is_renamed() {
        let sql = translate(
            "SELECT singer.name FROM singer",
            &[("singer", "sngr"), ("name", "nm")],
        );
        assert_eq!(sql, "SELECT sngr.nm FROM sngr");
    }

    #[test]
    fn unmapped_identifiers_and_literals_are_untouched() {
        let sql = translate(
            "SELECT count(*) FROM stadium WHERE capacity > 5000 AND location = 'name'",
            &[("stadium", "stdm"), ("name", "nm")],
        );
        assert_eq!(
            sql,
            "SELECT count(*) FROM stdm WHERE capacity > 5000 AND location = 'name'"
        );
    }

    #[test]
    fn preserves_quote_style() {
        let sql = translate("SELECT \"Song_Name\" FROM singer", &[("song_name", "sng_nm")]);
        assert_eq!(sql, "SELECT \"sng_nm\" FROM singer");
    }

    #[test]
    fn renames_inside_subqueries_and_set_operations() {
        let sql = translate(
            "SELECT name FROM stadium WHERE stadium_id NOT IN (SELECT stadium_id FROM concert) \
             UNION SELECT name FROM singer",
            &[
                ("name", "nm"),
                ("stadium", "stdm"),
                ("stadium_id", "stdm_id"),
                ("concert", "cncrt"),
                ("singer", "sngr"),
            ],
        );
        assert_eq!(
            sql,
            "SELECT nm FROM stdm WHERE stdm_id NOT IN (SELECT stdm_id FROM cncrt) \
             UNION SELECT nm FROM sngr"
        );
    }

    #[test]
    fn renames_select_aliases_ctes_and_qualified_wildcards() {
        let sql = translate(
            "WITH recent AS (SELECT * FROM concert) SELECT recent.*, theme AS theme FROM recent",
            &[("recent", "rcnt"), ("concert", "cncrt"), ("theme", "thm")],
        );
        assert_eq!(
            sql,
            "WITH rcnt AS (SELECT * FROM cncrt) SELECT rcnt.*, thm AS thm FROM rcnt"
        );
    }

    #[test]
    fn renames_join_using_columns() {
        let entries = [
            ("singer", "sngr"),
            ("concert", "cncrt"),
            ("singer_in_concert", "sic"),
            ("singer_id", "sngr_id"),
            ("concert_id", "cncrt_id"),
        ];
        let sql = translate(
            "SELECT singer_id FROM singer JOIN concert USING (singer_id)",
            &entries,
        );
        assert_eq!(sql, "SELECT sngr_id FROM sngr JOIN cncrt USING(sngr_id)");

        let nested = translate(
            "SELECT count(*) FROM singer JOIN (singer_in_concert JOIN concert USING (concert_id)) \
             USING (singer_id)",
            &entries,
        );
        assert!(nested.contains("USING(cncrt_id)"), "{nested}");
        assert!(nested.contains("USING(sngr_id)"), "{nested}");
        assert!(!nested.contains("singer_id"), "{nested}");
    }

    #[test]
    fn renames_alias_column_lists() {
        let sql = translate(
            "WITH names (name) AS (SELECT name FROM singer) SELECT name FROM names",
            &[("name", "nm"), ("singer", "sngr")],
        );
        assert!(!sql.contains("name,") && !sql.contains("(name)"), "{sql}");
        assert!(sql.contains("(nm)"), "{sql}");
        assert!(sql.ends_with("SELECT nm FROM names"), "{sql}");
    }

    #[test]
    fn counts_renamed_identifiers() {
        let mut statement = SqliteCodec.parse("SELECT a, b FROM t").unwrap();
        let renamed = rewrite_statement(&mut statement, &map(&[("a", "x"), ("t", "u")]));
        assert_eq!(renamed, 2);
    }
}
