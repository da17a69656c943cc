//! Extract table names from a query tree for cache tagging
//!
//! Tables are collected in first-encounter order of a fixed walk:
//! FROM (left to right), projection, WHERE, GROUP BY, HAVING, ORDER BY,
//! set-operation branches, then any CTE body that was never referenced.
//! A CTE reference is expanded in place the first time it is met. Inside a
//! CTE body only the CTEs declared before it are visible (plus itself when
//! recursive), so `WITH users AS (SELECT * FROM users ...)` depends on the
//! physical `users` table.
//!
//! Every match over node kinds below is exhaustive on purpose: a new node kind
//! in `sqlcache-ast` must not compile until it is handled here.

use std::collections::{BTreeSet, HashSet};

use sqlcache_ast::{
    CommonTableExpr, Expression, FromClause, SelectItem, SelectStmt, SqlChunk, SqlFragment, Table,
};

/// Ordered, de-duplicated physical tables a read statement depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedTables {
    tables: Vec<String>,
    seen: HashSet<String>,
}

impl UsedTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a table; returns false if it was already present
    fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.tables.push(name.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tables
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.seen.contains(table)
    }

    /// Table names as cache tags
    pub fn to_tags(&self) -> BTreeSet<String> {
        self.tables.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a UsedTables {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for UsedTables {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut used = UsedTables::new();
        for name in iter {
            used.insert(name.as_ref());
        }
        used
    }
}

/// Extract all physical tables referenced by a SELECT statement
pub fn extract_tables_from_select(stmt: &SelectStmt) -> UsedTables {
    let mut collector = TableCollector::default();
    collector.visit_select(stmt);
    collector.tables
}

#[derive(Default)]
struct TableCollector<'a> {
    tables: UsedTables,
    /// Visible part of each WITH clause in scope, outermost first
    scopes: Vec<&'a [CommonTableExpr]>,
    /// CTEs already walked, by identity
    expanded: Vec<&'a CommonTableExpr>,
}

impl<'a> TableCollector<'a> {
    fn visit_select(&mut self, stmt: &'a SelectStmt) {
        self.scopes.push(&stmt.with_clause);

        if let Some(from) = &stmt.from {
            self.visit_from(from);
        }

        for item in &stmt.select_list {
            match item {
                SelectItem::Expression { expr, .. } => self.visit_expression(expr),
                SelectItem::Wildcard | SelectItem::QualifiedWildcard { .. } => {}
            }
        }

        if let Some(where_clause) = &stmt.where_clause {
            self.visit_expression(where_clause);
        }

        for expr in &stmt.group_by {
            self.visit_expression(expr);
        }

        if let Some(having) = &stmt.having {
            self.visit_expression(having);
        }

        for order_item in &stmt.order_by {
            self.visit_expression(&order_item.expr);
        }

        // The WITH clause covers every branch of a compound query
        if let Some(set_op) = &stmt.set_operation {
            self.visit_select(&set_op.right);
        }

        // CTEs never referenced above
        let depth = self.scopes.len() - 1;
        for index in 0..stmt.with_clause.len() {
            self.expand_cte(depth, index);
        }

        self.scopes.pop();
    }

    fn visit_from(&mut self, from: &'a FromClause) {
        match from {
            FromClause::Table(table) => self.visit_table(table),
            FromClause::Aliased { source, .. } => self.visit_from(source),
            FromClause::Subquery { query, .. } => self.visit_select(query),
            FromClause::Raw(fragment) => self.visit_fragment(fragment),
            FromClause::Join { left, right, condition, .. } => {
                self.visit_from(left);
                self.visit_from(right);
                if let Some(cond) = condition {
                    self.visit_expression(cond);
                }
            }
        }
    }

    fn visit_table(&mut self, table: &'a Table) {
        if table.schema.is_none() {
            if let Some((depth, index)) = self.lookup_cte(&table.name) {
                self.expand_cte(depth, index);
                return;
            }
        }
        self.tables.insert(table.canonical_name());
    }

    fn visit_fragment(&mut self, fragment: &'a SqlFragment) {
        for chunk in &fragment.chunks {
            match chunk {
                SqlChunk::Table(table) => self.visit_table(table),
                SqlChunk::Subquery(query) => self.visit_select(query),
                SqlChunk::Text(_) | SqlChunk::Param(_) => {}
            }
        }
    }

    fn visit_expression(&mut self, expr: &'a Expression) {
        match expr {
            Expression::ScalarSubquery(stmt) => self.visit_select(stmt),
            Expression::Exists { subquery, .. } => self.visit_select(subquery),
            Expression::In { expr, subquery, .. } => {
                self.visit_expression(expr);
                self.visit_select(subquery);
            }
            Expression::BinaryOp { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            Expression::UnaryOp { expr, .. } | Expression::IsNull { expr, .. } => {
                self.visit_expression(expr);
            }
            Expression::Function { args, .. } => {
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            Expression::InList { expr, values, .. } => {
                self.visit_expression(expr);
                for val in values {
                    self.visit_expression(val);
                }
            }
            Expression::Raw(fragment) => self.visit_fragment(fragment),
            // Leaf expressions - no tables to extract
            Expression::Literal(_)
            | Expression::Placeholder(_)
            | Expression::ColumnRef { .. }
            | Expression::Wildcard => {}
        }
    }

    /// Innermost visible CTE named `name`, as (scope depth, position in its WITH clause)
    fn lookup_cte(&self, name: &str) -> Option<(usize, usize)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| scope.iter().position(|cte| cte.name == name).map(|index| (depth, index)))
    }

    /// Walk a CTE body once, resolved against the scopes visible where it was declared
    fn expand_cte(&mut self, depth: usize, index: usize) {
        let declared = self.scopes[depth];
        let cte = &declared[index];
        if self.expanded.iter().any(|seen| std::ptr::eq(*seen, cte)) {
            return;
        }
        self.expanded.push(cte);

        let visible = if cte.recursive { index + 1 } else { index };
        let inner_scopes = self.scopes.split_off(depth + 1);
        self.scopes[depth] = &declared[..visible];
        self.visit_select(&cte.query);
        self.scopes[depth] = declared;
        self.scopes.extend(inner_scopes);
    }
}

#[cfg(test)]
mod tests {
    use sqlcache_ast::{alias, Expression, FromClause, OrderDirection, SelectStmt, SqlFragment, Table};

    use super::*;

    fn names(used: &UsedTables) -> Vec<&str> {
        used.iter().map(String::as_str).collect()
    }

    fn on(left: &str, right: &str) -> Expression {
        Expression::eq(Expression::column(left, "id"), Expression::column(right, "ref_id"))
    }

    #[test]
    fn test_extract_simple_select() {
        let users = Table::new("users");
        let tables = extract_tables_from_select(&SelectStmt::from_table(&users));
        assert_eq!(names(&tables), vec!["users"]);
    }

    #[test]
    fn test_extract_join() {
        let users = Table::new("users");
        let orders = Table::new("orders");
        let stmt = SelectStmt::from(alias(&users, "u")).inner_join(alias(&orders, "o"), on("u", "o"));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users", "orders"]);
    }

    #[test]
    fn test_extract_qualified_table_name() {
        let users = Table::qualified("public", "users");
        let tables = extract_tables_from_select(&SelectStmt::from_table(&users));
        // Should extract just the table name, not the schema
        assert_eq!(names(&tables), vec!["users"]);
    }

    #[test]
    fn test_self_join_through_aliases_collapses() {
        let a = Table::new("a");
        let b = Table::new("b");
        let stmt = SelectStmt::from_table(&a)
            .left_join(&b, on("a", "b"))
            .left_join(alias(&b, "b2"), on("a", "b2"));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_keeps_first_position() {
        let a = Table::new("a");
        let b = Table::new("b");
        let c = Table::new("c");
        let stmt = SelectStmt::from(alias(&b, "b1"))
            .inner_join(&a, on("b1", "a"))
            .inner_join(alias(&b, "b2"), on("a", "b2"))
            .inner_join(&c, on("b2", "c"));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_raw_fragment_resolves_embedded_table() {
        let users = Table::new("users");
        let fragment = SqlFragment::new().text("(select * from ").table(&users).text(" where active) as u");
        let tables = extract_tables_from_select(&SelectStmt::from(fragment));
        assert_eq!(names(&tables), vec!["users"]);
    }

    #[test]
    fn test_opaque_text_contributes_nothing() {
        let fragment = SqlFragment::new().text("generate_series(1, 10)");
        let tables = extract_tables_from_select(&SelectStmt::from(fragment));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_nested_derived_tables_flatten() {
        let users = Table::new("users");
        let orders = Table::new("orders");
        let inner = SelectStmt::from_table(&orders);
        let middle = SelectStmt::from(FromClause::subquery(inner, "o")).inner_join(&users, on("o", "users"));
        let outer = SelectStmt::from(FromClause::subquery(middle, "m"));

        let tables = extract_tables_from_select(&outer);
        assert_eq!(names(&tables), vec!["orders", "users"]);
    }

    #[test]
    fn test_scalar_subqueries_in_projection_and_filter() {
        let users = Table::new("users");
        let orders = Table::new("orders");
        let bans = Table::new("bans");
        let stmt = SelectStmt::from_table(&users)
            .column(Expression::column("users", "id"), None)
            .column(Expression::scalar_subquery(SelectStmt::from_table(&orders)), Some("order_count"))
            .filter(Expression::UnaryOp {
                op: sqlcache_ast::UnaryOperator::Not,
                expr: Box::new(Expression::exists(SelectStmt::from_table(&bans))),
            });

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users", "orders", "bans"]);
    }

    #[test]
    fn test_correlated_subquery_in_join_condition() {
        let users = Table::new("users");
        let orders = Table::new("orders");
        let refunds = Table::new("refunds");
        let condition = Expression::and(
            on("users", "orders"),
            Expression::in_subquery(Expression::column("orders", "id"), SelectStmt::from_table(&refunds)),
        );
        let stmt = SelectStmt::from_table(&users).inner_join(&orders, condition);

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users", "orders", "refunds"]);
    }

    #[test]
    fn test_set_operation_visits_every_branch() {
        let a = Table::new("a");
        let b = Table::new("b");
        let c = Table::new("c");
        let stmt = SelectStmt::from_table(&a)
            .union_all(SelectStmt::from_table(&b))
            .intersect(SelectStmt::from_table(&c))
            .except(SelectStmt::from_table(&a));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cte_reference_is_not_a_table() {
        let orders = Table::new("orders");
        let stmt = SelectStmt::from_table(&Table::new("recent"))
            .with("recent", SelectStmt::from_table(&orders).limit(10));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["orders"]);
    }

    #[test]
    fn test_recursive_cte_terminates() {
        let edges = Table::new("edges");
        let body = SelectStmt::from_table(&edges)
            .union_all(SelectStmt::from_table(&Table::new("reach")).inner_join(&edges, on("reach", "edges")));
        let stmt = SelectStmt::from_table(&Table::new("reach")).with_recursive("reach", body);

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["edges"]);
    }

    #[test]
    fn test_cte_body_sees_table_it_shadows() {
        let users = Table::new("users");
        let active = SelectStmt::from_table(&users).filter(Expression::column("users", "active"));
        let stmt = SelectStmt::from_table(&users).with("users", active);

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users"]);
    }

    #[test]
    fn test_cte_body_cannot_see_later_sibling() {
        let stmt = SelectStmt::from_table(&Table::new("a"))
            .with("a", SelectStmt::from_table(&Table::new("b")))
            .with("b", SelectStmt::from_table(&Table::new("orders")));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["b", "orders"]);
    }

    #[test]
    fn test_cte_body_sees_earlier_sibling() {
        let stmt = SelectStmt::from_table(&Table::new("b"))
            .with("a", SelectStmt::from_table(&Table::new("orders")))
            .with("b", SelectStmt::from_table(&Table::new("a")));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["orders"]);
    }

    #[test]
    fn test_nested_with_resolves_innermost_first() {
        let inner = SelectStmt::from_table(&Table::new("t")).with("t", SelectStmt::from_table(&Table::new("inner_src")));
        let stmt = SelectStmt::from(FromClause::subquery(inner, "s"))
            .inner_join(&Table::new("t"), on("s", "t"))
            .with("t", SelectStmt::from_table(&Table::new("outer_src")));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["inner_src", "outer_src"]);
    }

    #[test]
    fn test_walk_order_across_clauses() {
        let sub = |name: &str| SelectStmt::from_table(&Table::new(name));
        // Built in reverse clause order; the walk order must not depend on it
        let stmt = SelectStmt::from_table(&Table::new("f"))
            .order_by(Expression::scalar_subquery(sub("o")), OrderDirection::Desc)
            .having(Expression::in_subquery(Expression::column("f", "id"), sub("h")))
            .group_by(Expression::scalar_subquery(sub("g")))
            .filter(Expression::exists(sub("w")))
            .column(Expression::scalar_subquery(sub("p")), Some("p"))
            .union(sub("u"));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["f", "p", "w", "g", "h", "o", "u"]);
    }

    #[test]
    fn test_subqueries_in_grouping_positions() {
        let users = Table::new("users");
        let grouped = SelectStmt::from_table(&users).group_by(Expression::scalar_subquery(SelectStmt::from_table(&Table::new("regions"))));
        let having = SelectStmt::from_table(&users).having(Expression::exists(SelectStmt::from_table(&Table::new("quotas"))));
        let ordered = SelectStmt::from_table(&users)
            .order_by(Expression::scalar_subquery(SelectStmt::from_table(&Table::new("ranks"))), OrderDirection::Asc);

        assert_eq!(names(&extract_tables_from_select(&grouped)), vec!["users", "regions"]);
        assert_eq!(names(&extract_tables_from_select(&having)), vec!["users", "quotas"]);
        assert_eq!(names(&extract_tables_from_select(&ordered)), vec!["users", "ranks"]);
    }

    #[test]
    fn test_raw_expression_with_embedded_subquery() {
        let users = Table::new("users");
        let predicate = SqlFragment::new()
            .text("\"id\" not in (")
            .subquery(SelectStmt::from_table(&Table::new("bans")))
            .text(") and \"org_id\" = ")
            .param(7)
            .text(" and exists (select 1 from ")
            .table(&Table::new("orgs"))
            .text(")");
        let stmt = SelectStmt::from_table(&users).filter(Expression::Raw(predicate));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users", "bans", "orgs"]);
    }

    #[test]
    fn test_raw_source_with_embedded_subquery() {
        let source = SqlFragment::new()
            .text("(")
            .subquery(SelectStmt::from_table(&Table::new("orders")).union(SelectStmt::from_table(&Table::new("archived_orders"))))
            .text(") as all_orders");
        let stmt = SelectStmt::from(source).inner_join(&Table::new("users"), on("all_orders", "users"));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["orders", "archived_orders", "users"]);
    }

    #[test]
    fn test_unreferenced_cte_still_counts() {
        let users = Table::new("users");
        let audit = Table::new("audit");
        let stmt = SelectStmt::from_table(&users).with("unused", SelectStmt::from_table(&audit));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["users", "audit"]);
    }

    #[test]
    fn test_schema_qualified_name_bypasses_cte_lookup() {
        let shadowed = Table::qualified("public", "recent");
        let stmt = SelectStmt::from_table(&shadowed).with("recent", SelectStmt::from_table(&Table::new("orders")));

        let tables = extract_tables_from_select(&stmt);
        assert_eq!(names(&tables), vec!["recent", "orders"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let a = Table::new("a");
        let b = Table::new("b");
        let stmt = SelectStmt::from_table(&a)
            .left_join(&b, on("a", "b"))
            .filter(Expression::exists(SelectStmt::from_table(&b)));

        let first = extract_tables_from_select(&stmt);
        let second = extract_tables_from_select(&stmt);
        assert_eq!(first, second);
        assert_eq!(first.to_tags().len(), 2);
    }

    #[test]
    fn test_used_tables_from_iter_dedupes() {
        let used: UsedTables = ["users", "orders", "users"].into_iter().collect();
        assert_eq!(names(&used), vec!["users", "orders"]);
        assert!(used.contains("orders"));
    }
}
