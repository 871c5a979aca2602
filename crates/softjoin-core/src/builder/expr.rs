//! Expression builder for WHERE and ON predicates.

use super::value::{SqlValue, ToSqlValue};
use crate::error::BuildError;

/// Comparison operators accepted by `on`/`where` style calls.
const OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "LIKE", "NOT LIKE", "IS", "IS NOT",
];

/// Normalizes a comparison operator, rejecting anything that is not a known
/// binary comparison.
///
/// # Errors
///
/// Returns [`BuildError::InvalidOperator`] for unknown operators.
pub fn check_operator(op: &str) -> Result<String, BuildError> {
    let normalized = op.trim().to_ascii_uppercase();
    if OPERATORS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(BuildError::InvalidOperator(String::from(op)))
    }
}

/// Creates a column reference.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        table: None,
        name: String::from(name),
    }
}

/// A column reference.
#[derive(Debug, Clone)]
pub struct Column {
    /// Optional table qualifier.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(table: &str, name: &str) -> Self {
        Self {
            table: Some(String::from(table)),
            name: String::from(name),
        }
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Creates an equality expression against a bound value.
    #[must_use]
    pub fn eq<T: ToSqlValue>(self, value: T) -> ExprBuilder {
        ExprBuilder::binary(self.into(), "=", value.to_sql_value().into())
    }

    /// Compares two columns (`a.x = b.y`).
    #[must_use]
    pub fn eq_col(self, other: Self) -> ExprBuilder {
        ExprBuilder::binary(self.into(), "=", other.into())
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> ExprBuilder {
        ExprBuilder::postfix(self.into(), "IS NULL")
    }
}

/// An SQL fragment together with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprBuilder {
    sql: String,
    params: Vec<SqlValue>,
}

impl ExprBuilder {
    /// Creates a new expression from raw SQL.
    ///
    /// **Warning**: Only use this for SQL fragments that don't contain user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![],
        }
    }

    /// `left <op> right` where both sides are column references.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidOperator`] for unknown operators.
    pub fn compare_columns(left: &str, op: &str, right: &str) -> Result<Self, BuildError> {
        let op = check_operator(op)?;
        Ok(Self::binary(Self::raw(left), &op, Self::raw(right)))
    }

    /// `column <op> ?` with `value` bound as a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidOperator`] for unknown operators.
    pub fn compare_value<T: ToSqlValue>(
        column: &str,
        op: &str,
        value: T,
    ) -> Result<Self, BuildError> {
        let op = check_operator(op)?;
        Ok(Self::binary(
            Self::raw(column),
            &op,
            value.to_sql_value().into(),
        ))
    }

    fn binary(left: Self, op: &str, right: Self) -> Self {
        let mut params = left.params;
        params.extend(right.params);
        Self {
            sql: format!("{} {op} {}", left.sql, right.sql),
            params,
        }
    }

    fn postfix(operand: Self, op: &str) -> Self {
        Self {
            sql: format!("{} {op}", operand.sql),
            params: operand.params,
        }
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, "AND", other)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, "OR", other)
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn paren(self) -> Self {
        Self {
            sql: format!("({})", self.sql),
            params: self.params,
        }
    }

    /// Returns the SQL string.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

impl From<Column> for ExprBuilder {
    fn from(col: Column) -> Self {
        Self {
            sql: col.to_sql(),
            params: vec![],
        }
    }
}

impl From<SqlValue> for ExprBuilder {
    fn from(value: SqlValue) -> Self {
        Self {
            sql: String::from("?"),
            params: vec![value],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        let expr = Column::qualified("orders", "deleted_at").is_null();
        assert_eq!(expr.sql(), "orders.deleted_at IS NULL");
        assert!(expr.params().is_empty());
    }

    #[test]
    fn test_column_to_column() {
        let expr = col("orders.id").eq_col(col("line_items.order_id"));
        assert_eq!(expr.sql(), "orders.id = line_items.order_id");
    }

    #[test]
    fn test_compare_value_is_parameterized() {
        let malicious = "'; DROP TABLE users; --";
        let expr = ExprBuilder::compare_value("users.name", "=", malicious).unwrap();
        assert_eq!(expr.sql(), "users.name = ?");
        assert!(matches!(&expr.params()[0], SqlValue::Text(s) if s == malicious));
    }

    #[test]
    fn test_operator_normalization() {
        assert_eq!(check_operator(" like ").unwrap(), "LIKE");
        assert_eq!(check_operator("<>").unwrap(), "<>");
        assert_eq!(
            check_operator("=="),
            Err(BuildError::InvalidOperator(String::from("==")))
        );
    }

    #[test]
    fn test_and_or_paren() {
        let expr = col("a")
            .eq(1)
            .or(col("b").eq(2))
            .paren()
            .and(col("c").is_null());
        assert_eq!(expr.sql(), "(a = ? OR b = ?) AND c IS NULL");
        assert_eq!(expr.params().len(), 2);
    }
}
