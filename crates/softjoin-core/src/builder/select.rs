//! SELECT statement builder.
//!
//! `Select` is the host query layer the soft-delete rewriter wraps. Its
//! `join` is the single canonical entry point for joins: every predicate,
//! whether a key triple or a closure, is normalized into a [`JoinClause`](super::join::JoinClause)
//! before it reaches the statement.

use std::sync::Arc;

use super::expr::ExprBuilder;
use super::join::{JoinKind, JoinOn, TableRef};
use super::value::SqlValue;
use crate::dialect::{Dialect, GenericDialect};
use crate::error::BuildError;

/// A join that has been added to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The kind of join.
    pub kind: JoinKind,
    /// The rendered table, including any alias.
    pub table: String,
    /// The ON condition.
    pub condition: ExprBuilder,
}

impl Join {
    /// Returns `KIND JOIN table ON condition`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!("{} {} ON {}", self.kind, self.table, self.condition.sql())
    }
}

/// A SELECT statement builder.
///
/// The FROM table is fixed at construction, so every builder can be built.
#[derive(Debug, Clone)]
pub struct Select {
    dialect: Arc<dyn Dialect>,
    distinct: bool,
    columns: Vec<String>,
    from: String,
    joins: Vec<Join>,
    where_clause: Option<ExprBuilder>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Creates a `SELECT * FROM table` builder using the generic dialect.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            dialect: Arc::new(GenericDialect::new()),
            distinct: false,
            columns: vec![],
            from: String::from(table),
            joins: vec![],
            where_clause: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    /// Replaces the dialect used to render raw fragments.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    /// Returns the active dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the FROM table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.from
    }

    /// Returns the joins added so far, in order.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Specifies the columns to select.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| String::from(*s)).collect();
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a join.
    ///
    /// `on` is normalized into a [`JoinClause`](super::join::JoinClause). With
    /// `is_filter_join`, the second operand of a key triple is a bound value
    /// rather than a column.
    ///
    /// # Errors
    ///
    /// Returns the dialect's error for a malformed raw table, or the clause's
    /// error for an invalid operator or an empty closure.
    pub fn join(
        mut self,
        table: impl Into<TableRef>,
        on: impl Into<JoinOn>,
        kind: JoinKind,
        is_filter_join: bool,
    ) -> Result<Self, BuildError> {
        let table = table.into().render(self.dialect.as_ref())?;
        let condition = on.into().into_clause(is_filter_join).into_condition(&table)?;
        self.joins.push(Join {
            kind,
            table,
            condition,
        });
        Ok(self)
    }

    /// Adds a WHERE condition, AND-ed with any previous one.
    #[must_use]
    pub fn where_clause(mut self, expr: ExprBuilder) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    /// Adds an ORDER BY column; a `-` prefix sorts descending.
    #[must_use]
    pub fn order_by(mut self, spec: &str) -> Self {
        let term = match spec.strip_prefix('-') {
            Some(column) => format!("{column} DESC"),
            None => String::from(spec),
        };
        self.order_by.push(term);
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Adds an OFFSET clause.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Builds the SELECT statement and returns SQL with parameters.
    ///
    /// Join parameters precede WHERE parameters, matching their position in
    /// the SQL text.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let mut sql = String::from("SELECT ");
        let mut params = vec![];

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
            params.extend(join.condition.params().iter().cloned());
        }

        if let Some(ref where_expr) = self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(where_expr.sql());
            params.extend(where_expr.params().iter().cloned());
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        if let Some(n) = self.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }

        (sql, params)
    }

    /// Builds the SELECT statement and returns only the SQL string.
    #[must_use]
    pub fn build_sql(self) -> String {
        let (sql, _params) = self.build();
        sql
    }
}
