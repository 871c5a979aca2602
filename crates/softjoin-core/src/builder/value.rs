//! Bound parameter values.
//!
//! Join predicates compare columns with columns, except for filter joins
//! (`is_filter_join`) where the right-hand operand is a value. Those values
//! are never interpolated into the SQL text; they travel next to it as
//! parameters.

/// A SQL value bound as a `?` parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Used for diagnostics such as the CLI's rendered output. Prefer the
    /// parameterized form returned by `build()` when executing.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

/// Types that can be bound as a join or WHERE parameter.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_rendering() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Bool(false).to_sql_inline(), "FALSE");
        assert_eq!(SqlValue::Int(-7).to_sql_inline(), "-7");
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some("paid").to_sql_value(), SqlValue::Text(String::from("paid")));
    }
}
