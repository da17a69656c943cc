//! Top-level statements and the compiled-query handoff

use std::fmt;

use sqlcache_types::SqlValue;

use crate::{DeleteStmt, InsertStmt, SelectStmt, Table, UpdateStmt};

/// A statement the cache layer knows how to route
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Box<SelectStmt>),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

/// Statement kind, used for routing and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// True for statements that mutate table data
    pub fn is_write(self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
        }
    }

    /// Tables whose data this statement writes; empty for SELECT
    pub fn target_tables(&self) -> Vec<&Table> {
        match self {
            Statement::Select(_) => Vec::new(),
            Statement::Insert(insert) => vec![&insert.table],
            Statement::Update(update) => vec![&update.table],
            Statement::Delete(delete) => delete.tables.iter().collect(),
        }
    }
}

impl From<SelectStmt> for Statement {
    fn from(stmt: SelectStmt) -> Self {
        Statement::Select(Box::new(stmt))
    }
}

impl From<InsertStmt> for Statement {
    fn from(stmt: InsertStmt) -> Self {
        Statement::Insert(stmt)
    }
}

impl From<UpdateStmt> for Statement {
    fn from(stmt: UpdateStmt) -> Self {
        Statement::Update(stmt)
    }
}

impl From<DeleteStmt> for Statement {
    fn from(stmt: DeleteStmt) -> Self {
        Statement::Delete(stmt)
    }
}

/// Output of the SQL compiler: final text, ordered bound parameters and the
/// statement tree it was rendered from
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub statement: Statement,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>, statement: impl Into<Statement>) -> Self {
        CompiledQuery { sql: sql.into(), params, statement: statement.into() }
    }

    pub fn kind(&self) -> StatementKind {
        self.statement.kind()
    }
}
