//! Raw SQL fragments
//!
//! A fragment is hand-written SQL that may interpolate schema objects. The
//! interpolated tables and subqueries stay structured, so a fragment like
//! `select * from <users> where ...` still resolves to `users`.

use sqlcache_types::SqlValue;

use crate::{SelectStmt, Table};

/// One piece of a raw SQL fragment
#[derive(Debug, Clone, PartialEq)]
pub enum SqlChunk {
    /// Literal SQL text, opaque to dependency tracking
    Text(String),
    /// Interpolated table object
    Table(Table),
    /// Interpolated bound value
    Param(SqlValue),
    /// Interpolated subquery
    Subquery(Box<SelectStmt>),
}

/// Raw SQL assembled from text and interpolated objects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub chunks: Vec<SqlChunk>,
}

impl SqlFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.chunks.push(SqlChunk::Text(text.into()));
        self
    }

    pub fn table(mut self, table: &Table) -> Self {
        self.chunks.push(SqlChunk::Table(table.clone()));
        self
    }

    pub fn param(mut self, value: impl Into<SqlValue>) -> Self {
        self.chunks.push(SqlChunk::Param(value.into()));
        self
    }

    pub fn subquery(mut self, query: SelectStmt) -> Self {
        self.chunks.push(SqlChunk::Subquery(Box::new(query)));
        self
    }
}
