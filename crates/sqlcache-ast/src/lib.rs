//! Compiled query structure
//!
//! The query builder and SQL compiler live outside this workspace. What they
//! hand over is a [`CompiledQuery`]: the final SQL text, the ordered bound
//! parameters, and the structural tree the statement was compiled from. The
//! tree is a closed set of node kinds so that every consumer has to handle
//! each of them explicitly.

mod dml;
mod expression;
mod fragment;
mod operators;
mod select;
mod statement;
mod table;

pub use dml::*;
pub use expression::Expression;
pub use fragment::{SqlChunk, SqlFragment};
pub use operators::{BinaryOperator, UnaryOperator};
pub use select::*;
pub use statement::{CompiledQuery, Statement, StatementKind};
pub use table::{alias, Table};
