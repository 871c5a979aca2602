//! Errors raised while assembling a statement.

/// An error raised by the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A comparison operator outside the supported set.
    InvalidOperator(String),
    /// A join whose predicate closure added no condition.
    EmptyJoinCondition {
        /// The joined table.
        table: String,
    },
    /// A raw SQL fragment the dialect refused to render.
    MalformedRawExpression {
        /// The offending fragment.
        expr: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A join kind name that does not map to a [`JoinKind`](crate::builder::JoinKind).
    UnknownJoinKind(String),
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidOperator(op) => write!(f, "invalid comparison operator `{op}`"),
            Self::EmptyJoinCondition { table } => {
                write!(f, "join against `{table}` has an empty ON condition")
            }
            Self::MalformedRawExpression { expr, reason } => {
                write!(f, "malformed raw expression `{expr}`: {reason}")
            }
            Self::UnknownJoinKind(kind) => write!(f, "unknown join kind `{kind}`"),
        }
    }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = BuildError::EmptyJoinCondition {
            table: String::from("orders"),
        };
        assert_eq!(err.to_string(), "join against `orders` has an empty ON condition");
        assert_eq!(
            BuildError::InvalidOperator(String::from("==")).to_string(),
            "invalid comparison operator `==`"
        );
    }
}
