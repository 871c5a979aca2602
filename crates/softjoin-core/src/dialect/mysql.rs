//! MySQL dialect.

use super::Dialect;

/// MySQL quotes identifiers with backticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::RawExpr;

    #[test]
    fn test_backtick_balance() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.render_raw(&RawExpr::new("`orders`")).unwrap(), "`orders`");
        assert!(dialect.render_raw(&RawExpr::new("`orders")).is_err());
        // Double quotes are plain characters for MySQL identifiers.
        assert!(dialect.render_raw(&RawExpr::new("\"orders")).is_ok());
    }
}
