//! Join clauses.
//!
//! A join condition is given either as a `first <op> second` triple or as a
//! closure that receives an empty [`JoinClause`] and returns it with
//! conditions added. Both forms end up as a `JoinClause`; the closure form
//! is the more expressive one, so the triple is normalized into it.

use core::fmt;
use core::str::FromStr;

use super::expr::ExprBuilder;
use super::value::ToSqlValue;
use crate::dialect::{Dialect, RawExpr};
use crate::error::BuildError;

/// The kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// INNER JOIN
    #[default]
    Inner,
    /// LEFT JOIN
    Left,
    /// RIGHT JOIN
    Right,
    /// FULL JOIN
    Full,
}

impl JoinKind {
    /// Returns the SQL keyword sequence.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for JoinKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(Self::Inner),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "full" => Ok(Self::Full),
            _ => Err(BuildError::UnknownJoinKind(String::from(s))),
        }
    }
}

/// The table side of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// A table name, optionally followed by `as alias`.
    Name(String),
    /// A raw fragment rendered by the active dialect.
    Raw(RawExpr),
}

impl TableRef {
    /// Renders the table to the text used in the statement.
    ///
    /// # Errors
    ///
    /// Propagates the dialect's error for a malformed raw fragment.
    pub fn render(&self, dialect: &dyn Dialect) -> Result<String, BuildError> {
        match self {
            Self::Name(name) => Ok(name.clone()),
            Self::Raw(expr) => dialect.render_raw(expr),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<RawExpr> for TableRef {
    fn from(expr: RawExpr) -> Self {
        Self::Raw(expr)
    }
}

/// Splits `"orders as o"` (or `"orders o"`) into the table name and the name
/// the relation is known by in the statement (`("orders", "o")`). Without an
/// alias both are the table name.
///
/// A bare alias must be a plain identifier, so a quoted name containing a
/// space is not split.
#[must_use]
pub fn split_alias(table: &str) -> (&str, &str) {
    let table = table.trim();
    let lower = table.to_ascii_lowercase();
    if let Some(idx) = lower.find(" as ") {
        return (table[..idx].trim(), table[idx + 4..].trim());
    }
    match table.rsplit_once(char::is_whitespace) {
        Some((name, alias)) if is_identifier(alias) => (name.trim(), alias),
        _ => (table, table),
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

/// The conditions of a join's ON clause.
///
/// Methods never fail; the first invalid call is remembered and reported
/// when the clause is turned into a condition, so closures stay fluent.
#[derive(Debug, Clone, Default)]
pub struct JoinClause {
    conditions: Vec<(Connective, ExprBuilder)>,
    error: Option<BuildError>,
}

impl JoinClause {
    /// Creates an empty clause.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, connective: Connective, expr: Result<ExprBuilder, BuildError>) -> Self {
        match expr {
            Ok(expr) => self.conditions.push((connective, expr)),
            Err(e) if self.error.is_none() => self.error = Some(e),
            Err(_) => {}
        }
        self
    }

    /// Adds `first <op> second` comparing two columns, joined with AND.
    #[must_use]
    pub fn on(self, first: &str, op: &str, second: &str) -> Self {
        self.push(Connective::And, ExprBuilder::compare_columns(first, op, second))
    }

    /// Adds `first <op> second` comparing two columns, joined with OR.
    #[must_use]
    pub fn or_on(self, first: &str, op: &str, second: &str) -> Self {
        self.push(Connective::Or, ExprBuilder::compare_columns(first, op, second))
    }

    /// Adds `column <op> ?` with a bound value, joined with AND.
    #[must_use]
    pub fn where_op<T: ToSqlValue>(self, column: &str, op: &str, value: T) -> Self {
        self.push(Connective::And, ExprBuilder::compare_value(column, op, value))
    }

    /// Adds `column = ?` with a bound value, joined with AND.
    #[must_use]
    pub fn where_eq<T: ToSqlValue>(self, column: &str, value: T) -> Self {
        self.where_op(column, "=", value)
    }

    /// Adds `column IS NULL`, joined with AND.
    #[must_use]
    pub fn where_null(self, column: &str) -> Self {
        self.push(Connective::And, Ok(ExprBuilder::raw(format!("{column} IS NULL"))))
    }

    /// Adds `column IS NOT NULL`, joined with AND.
    #[must_use]
    pub fn where_not_null(self, column: &str) -> Self {
        self.push(
            Connective::And,
            Ok(ExprBuilder::raw(format!("{column} IS NOT NULL"))),
        )
    }

    /// Adds another clause as a single AND-ed condition. An empty clause
    /// adds nothing.
    ///
    /// The nested clause is parenthesized when it contains an OR, so that the
    /// conditions added after it cannot rebind its disjunction.
    #[must_use]
    pub fn nested(self, clause: Self) -> Self {
        if clause.is_empty() && clause.error.is_none() {
            return self;
        }
        let grouped = clause.has_or();
        let expr = clause
            .into_condition("nested clause")
            .map(|expr| if grouped { expr.paren() } else { expr });
        self.push(Connective::And, expr)
    }

    /// Returns the number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns whether no condition has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns whether any condition after the first is OR-ed in.
    #[must_use]
    pub fn has_or(&self) -> bool {
        self.conditions
            .iter()
            .skip(1)
            .any(|(connective, _)| *connective == Connective::Or)
    }

    /// Folds the clause into a single condition.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building the clause, or
    /// [`BuildError::EmptyJoinCondition`] if the clause has no conditions.
    pub fn into_condition(self, table: &str) -> Result<ExprBuilder, BuildError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let mut conditions = self.conditions.into_iter();
        let (_, first) = conditions.next().ok_or_else(|| BuildError::EmptyJoinCondition {
            table: String::from(table),
        })?;
        Ok(conditions.fold(first, |acc, (connective, expr)| match connective {
            Connective::And => acc.and(expr),
            Connective::Or => acc.or(expr),
        }))
    }
}

/// A join predicate: a key/operator/key triple or a clause-building closure.
pub enum JoinOn {
    /// `first <operator> second`.
    Keys {
        /// Left operand (a column).
        first: String,
        /// Comparison operator.
        operator: String,
        /// Right operand; a column, or a bound value for filter joins.
        second: String,
    },
    /// A closure adding conditions to an empty [`JoinClause`].
    Clause(Box<dyn FnOnce(JoinClause) -> JoinClause>),
}

impl JoinOn {
    /// Creates a key/operator/key predicate.
    #[must_use]
    pub fn keys(first: &str, operator: &str, second: &str) -> Self {
        Self::Keys {
            first: String::from(first),
            operator: String::from(operator),
            second: String::from(second),
        }
    }

    /// Creates a closure predicate.
    #[must_use]
    pub fn clause(f: impl FnOnce(JoinClause) -> JoinClause + 'static) -> Self {
        Self::Clause(Box::new(f))
    }

    /// Normalizes the predicate into clause form.
    ///
    /// With `is_filter_join`, the second operand of a key triple is bound as
    /// a value instead of being read as a column.
    #[must_use]
    pub fn into_clause(self, is_filter_join: bool) -> JoinClause {
        match self {
            Self::Keys {
                first,
                operator,
                second,
            } if is_filter_join => JoinClause::new().where_op(&first, &operator, second),
            Self::Keys {
                first,
                operator,
                second,
            } => JoinClause::new().on(&first, &operator, &second),
            Self::Clause(f) => f(JoinClause::new()),
        }
    }
}

impl fmt::Debug for JoinOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keys {
                first,
                operator,
                second,
            } => f
                .debug_struct("Keys")
                .field("first", first)
                .field("operator", operator)
                .field("second", second)
                .finish(),
            Self::Clause(_) => f.write_str("Clause(..)"),
        }
    }
}

impl From<(&str, &str, &str)> for JoinOn {
    fn from((first, operator, second): (&str, &str, &str)) -> Self {
        Self::keys(first, operator, second)
    }
}
