//! Data Manipulation Language (DML) types
//!
//! This module contains INSERT, UPDATE, and DELETE statement types. Each one
//! knows its target tables: the tables whose cached reads a successful write
//! has to invalidate.

use crate::{Expression, FromClause, SelectStmt, Table};

// ============================================================================
// INSERT Statement
// ============================================================================

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub table: Table,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

/// Source of data for INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// INSERT ... VALUES (...)
    Values(Vec<Vec<Expression>>),
    /// INSERT ... SELECT ...
    Select(Box<SelectStmt>),
}

impl InsertStmt {
    pub fn values(table: &Table, columns: &[&str], rows: Vec<Vec<Expression>>) -> Self {
        InsertStmt {
            table: table.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            source: InsertSource::Values(rows),
        }
    }

    pub fn select(table: &Table, columns: &[&str], query: SelectStmt) -> Self {
        InsertStmt {
            table: table.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            source: InsertSource::Select(Box::new(query)),
        }
    }
}

// ============================================================================
// UPDATE Statement
// ============================================================================

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub table: Table,
    pub assignments: Vec<Assignment>,
    /// Optional `UPDATE ... FROM` sources (read, not written)
    pub from: Option<FromClause>,
    pub where_clause: Option<Expression>,
}

/// Column assignment (column = value)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

impl UpdateStmt {
    pub fn new(table: &Table) -> Self {
        UpdateStmt { table: table.clone(), assignments: Vec::new(), from: None, where_clause: None }
    }

    pub fn set(mut self, column: impl Into<String>, value: Expression) -> Self {
        self.assignments.push(Assignment { column: column.into(), value });
        self
    }

    pub fn from(mut self, source: impl Into<FromClause>) -> Self {
        self.from = Some(source.into());
        self
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}

// ============================================================================
// DELETE Statement
// ============================================================================

/// DELETE statement
///
/// `tables` holds every table rows are deleted from; multi-table deletes
/// (`DELETE a, b FROM a JOIN b ...`) list more than one.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub tables: Vec<Table>,
    /// Optional `USING` / join sources
    pub using: Option<FromClause>,
    pub where_clause: Option<Expression>,
}

impl DeleteStmt {
    pub fn from_table(table: &Table) -> Self {
        DeleteStmt { tables: vec![table.clone()], using: None, where_clause: None }
    }

    pub fn from_tables(tables: &[&Table]) -> Self {
        DeleteStmt {
            tables: tables.iter().map(|t| (*t).clone()).collect(),
            using: None,
            where_clause: None,
        }
    }

    pub fn using(mut self, source: impl Into<FromClause>) -> Self {
        self.using = Some(source.into());
        self
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}
