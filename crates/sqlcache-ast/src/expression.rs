//! Expression nodes
//!
//! Expressions matter to the cache only where they embed a subquery or a raw
//! SQL fragment: those still create read dependencies on tables.

use sqlcache_types::SqlValue;

use crate::{BinaryOperator, SelectStmt, SqlFragment, UnaryOperator};

/// SQL expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Inline literal value
    Literal(SqlValue),
    /// Bound parameter placeholder, by position in `CompiledQuery::params`
    Placeholder(usize),
    /// Column reference (e.g. `u.id`); the qualifier may be an alias
    ColumnRef { table: Option<String>, column: String },
    /// `*` as used in `COUNT(*)`
    Wildcard,
    BinaryOp { op: BinaryOperator, left: Box<Expression>, right: Box<Expression> },
    UnaryOp { op: UnaryOperator, expr: Box<Expression> },
    Function { name: String, args: Vec<Expression> },
    IsNull { expr: Box<Expression>, negated: bool },
    InList { expr: Box<Expression>, values: Vec<Expression>, negated: bool },
    /// `expr IN (SELECT ...)`
    In { expr: Box<Expression>, subquery: Box<SelectStmt>, negated: bool },
    /// `EXISTS (SELECT ...)`
    Exists { subquery: Box<SelectStmt>, negated: bool },
    /// Subquery producing a single value
    ScalarSubquery(Box<SelectStmt>),
    /// Raw SQL spliced into an expression position
    Raw(SqlFragment),
}

impl Expression {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expression::ColumnRef { table: Some(table.into()), column: column.into() }
    }

    pub fn literal(value: impl Into<SqlValue>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::Equal, left, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::And, left, right)
    }

    pub fn exists(subquery: SelectStmt) -> Self {
        Expression::Exists { subquery: Box::new(subquery), negated: false }
    }

    pub fn in_subquery(expr: Expression, subquery: SelectStmt) -> Self {
        Expression::In { expr: Box::new(expr), subquery: Box::new(subquery), negated: false }
    }

    pub fn scalar_subquery(subquery: SelectStmt) -> Self {
        Expression::ScalarSubquery(Box::new(subquery))
    }
}
