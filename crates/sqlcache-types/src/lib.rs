//! Value types for the query cache
//!
//! This crate provides the data carried between the driver and the cache:
//! - SQL values bound as statement parameters or returned in rows
//! - Result rows
//! - A canonical byte encoding of values used for cache keys

mod row;
mod sql_value;

pub use row::Row;
pub use sql_value::SqlValue;
