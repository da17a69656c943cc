//! SELECT statement types
//!
//! This module contains all types related to SELECT queries including
//! SELECT items, FROM sources, JOINs, set operations and CTEs, plus the small
//! builder surface used to assemble them.

use crate::{Expression, SqlFragment, Table};

// ============================================================================
// Common Table Expressions (CTEs)
// ============================================================================

/// Common Table Expression (CTE) definition
///
/// Example: `WITH regional_sales AS (SELECT region, SUM(amount) FROM orders GROUP BY region)`
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpr {
    /// Name of the CTE
    pub name: String,
    /// The query defining the CTE
    pub query: Box<SelectStmt>,
    /// `WITH RECURSIVE`: the body may reference the CTE itself
    pub recursive: bool,
}

// ============================================================================
// SELECT Statement
// ============================================================================

/// SELECT statement structure
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// WITH clause CTEs, in declaration order
    pub with_clause: Vec<CommonTableExpr>,
    pub distinct: bool,
    pub select_list: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Set operation (UNION, INTERSECT, EXCEPT) combining this query with another
    pub set_operation: Option<SetOperation>,
}

/// Set operation combining two SELECT statements
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub op: SetOperator,
    pub all: bool, // true = ALL, false = DISTINCT (default)
    pub right: Box<SelectStmt>,
}

/// Set operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

/// Item in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// SELECT *
    Wildcard,
    /// SELECT table.* or SELECT alias.*
    QualifiedWildcard { qualifier: String },
    /// SELECT expr [AS alias]
    Expression { expr: Expression, alias: Option<String> },
}

/// FROM clause source
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// Physical table
    Table(Table),
    /// Any source under a correlation name (`users AS u`)
    Aliased { source: Box<FromClause>, alias: String },
    /// Derived table: `FROM (SELECT ...) AS alias`
    Subquery { query: Box<SelectStmt>, alias: String },
    /// Raw SQL used as a source
    Raw(SqlFragment),
    Join {
        left: Box<FromClause>,
        right: Box<FromClause>,
        join_type: JoinType,
        condition: Option<Expression>,
    },
}

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: OrderDirection,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl From<Table> for FromClause {
    fn from(table: Table) -> Self {
        FromClause::Table(table)
    }
}

impl From<&Table> for FromClause {
    fn from(table: &Table) -> Self {
        FromClause::Table(table.clone())
    }
}

impl From<SqlFragment> for FromClause {
    fn from(fragment: SqlFragment) -> Self {
        FromClause::Raw(fragment)
    }
}

impl FromClause {
    /// Derived table source
    pub fn subquery(query: SelectStmt, alias: impl Into<String>) -> Self {
        FromClause::Subquery { query: Box::new(query), alias: alias.into() }
    }
}

// ============================================================================
// Builder
// ============================================================================

impl Default for SelectStmt {
    fn default() -> Self {
        SelectStmt {
            with_clause: Vec::new(),
            distinct: false,
            select_list: vec![SelectItem::Wildcard],
            from: None,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            set_operation: None,
        }
    }
}

impl SelectStmt {
    /// `SELECT *` with no source
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT * FROM source`
    pub fn from(source: impl Into<FromClause>) -> Self {
        SelectStmt { from: Some(source.into()), ..Self::default() }
    }

    /// `SELECT * FROM table`
    pub fn from_table(table: &Table) -> Self {
        Self::from(table)
    }

    /// Replace the projection
    pub fn columns(mut self, items: Vec<SelectItem>) -> Self {
        self.select_list = items;
        self
    }

    /// Append an expression to the projection, replacing a bare `*`
    pub fn column(mut self, expr: Expression, alias: Option<&str>) -> Self {
        if self.select_list == [SelectItem::Wildcard] {
            self.select_list.clear();
        }
        self.select_list.push(SelectItem::Expression { expr, alias: alias.map(str::to_string) });
        self
    }

    /// Join `right` onto the current FROM source
    ///
    /// Joining onto a statement without a FROM source makes `right` the source.
    pub fn join(
        mut self,
        join_type: JoinType,
        right: impl Into<FromClause>,
        condition: Option<Expression>,
    ) -> Self {
        let right = right.into();
        self.from = Some(match self.from.take() {
            Some(left) => FromClause::Join {
                left: Box::new(left),
                right: Box::new(right),
                join_type,
                condition,
            },
            None => right,
        });
        self
    }

    pub fn inner_join(self, right: impl Into<FromClause>, on: Expression) -> Self {
        self.join(JoinType::Inner, right, Some(on))
    }

    pub fn left_join(self, right: impl Into<FromClause>, on: Expression) -> Self {
        self.join(JoinType::LeftOuter, right, Some(on))
    }

    pub fn right_join(self, right: impl Into<FromClause>, on: Expression) -> Self {
        self.join(JoinType::RightOuter, right, Some(on))
    }

    pub fn full_join(self, right: impl Into<FromClause>, on: Expression) -> Self {
        self.join(JoinType::FullOuter, right, Some(on))
    }

    pub fn cross_join(self, right: impl Into<FromClause>) -> Self {
        self.join(JoinType::Cross, right, None)
    }

    /// Add a WHERE predicate, AND-ing it with any existing one
    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => Expression::and(existing, predicate),
            None => predicate,
        });
        self
    }

    pub fn group_by(mut self, expr: Expression) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Expression) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, expr: Expression, direction: OrderDirection) -> Self {
        self.order_by.push(OrderByItem { expr, direction });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Declare a CTE on this statement
    pub fn with(mut self, name: impl Into<String>, query: SelectStmt) -> Self {
        self.with_clause.push(CommonTableExpr { name: name.into(), query: Box::new(query), recursive: false });
        self
    }

    /// Declare a CTE whose body can reference its own name
    pub fn with_recursive(mut self, name: impl Into<String>, query: SelectStmt) -> Self {
        self.with_clause.push(CommonTableExpr { name: name.into(), query: Box::new(query), recursive: true });
        self
    }

    pub fn union(self, other: SelectStmt) -> Self {
        self.set_op(SetOperator::Union, false, other)
    }

    pub fn union_all(self, other: SelectStmt) -> Self {
        self.set_op(SetOperator::Union, true, other)
    }

    pub fn intersect(self, other: SelectStmt) -> Self {
        self.set_op(SetOperator::Intersect, false, other)
    }

    pub fn except(self, other: SelectStmt) -> Self {
        self.set_op(SetOperator::Except, false, other)
    }

    fn set_op(mut self, op: SetOperator, all: bool, other: SelectStmt) -> Self {
        self.append_set_operation(SetOperation { op, all, right: Box::new(other) });
        self
    }

    /// Append a set operation at the end of the chain
    fn append_set_operation(&mut self, operation: SetOperation) {
        match &mut self.set_operation {
            Some(existing) => existing.right.append_set_operation(operation),
            None => self.set_operation = Some(operation),
        }
    }
}
