//! Physical table references

use crate::FromClause;

/// A physical table, as declared in the schema
///
/// The canonical name is the schema object's own name. Aliases never
/// replace it; they wrap the table in [`FromClause::Aliased`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    /// Optional schema qualifier (e.g. `public` in `public.users`)
    pub schema: Option<String>,
    pub name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table { schema: None, name: name.into() }
    }

    /// Create a schema-qualified table reference
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Table { schema: Some(schema.into()), name: name.into() }
    }

    /// Canonical table name used for dependency tracking (schema dropped)
    pub fn canonical_name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name as it would appear in SQL
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

/// Reference `table` under a different correlation name
///
/// Example: `alias(&users, "u2")` renders as `users AS u2`
pub fn alias(table: &Table, alias: impl Into<String>) -> FromClause {
    FromClause::Aliased { source: Box::new(FromClause::Table(table.clone())), alias: alias.into() }
}
