//! SQL Dialect support.
//!
//! Databases differ in how identifiers are quoted. The only dialect-specific
//! work the builder does is validating and rendering raw SQL fragments, such
//! as a raw table expression passed to `join`.

mod generic;
mod mysql;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;

use crate::error::BuildError;

/// A raw SQL fragment, inserted verbatim once the dialect has rendered it.
///
/// **Warning**: Only use this for SQL that doesn't contain user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExpr(String);

impl RawExpr {
    /// Wraps a raw SQL fragment.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// Returns the fragment as given.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: core::fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Renders a raw fragment to the text that goes into the statement.
    ///
    /// The fragment is trimmed. Empty fragments, fragments containing a
    /// statement terminator and fragments with unbalanced identifier quotes
    /// are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedRawExpression`] when the fragment is
    /// rejected.
    fn render_raw(&self, expr: &RawExpr) -> Result<String, BuildError> {
        let sql = expr.value().trim();
        let reject = |reason| BuildError::MalformedRawExpression {
            expr: String::from(expr.value()),
            reason,
        };
        if sql.is_empty() {
            return Err(reject("expression is empty"));
        }
        if sql.contains(';') {
            return Err(reject("statement terminator in expression"));
        }
        let quote = self.identifier_quote();
        if sql.chars().filter(|c| *c == quote).count() % 2 != 0 {
            return Err(reject("unbalanced identifier quote"));
        }
        Ok(String::from(sql))
    }
}
