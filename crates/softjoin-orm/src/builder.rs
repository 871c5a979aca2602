//! Soft-delete aware query builder.
//!
//! [`Builder`] wraps a [`Select`] and intercepts its joins. When the joined
//! table belongs to a soft-deletable model, the join predicate is narrowed
//! to rows whose deleted-at column is NULL. Every other operation is
//! forwarded to the wrapped `Select` unchanged.
//!
//! A `Builder` belongs to one unit of work. Build a new one per query;
//! share the registry (and, by cloning, the resolver) instead.

use std::sync::Arc;

use softjoin_core::builder::split_alias;
use softjoin_core::{ExprBuilder, JoinClause, JoinKind, JoinOn, Select, SqlValue, TableRef};
use tracing::{debug, trace};

use crate::config::RewriteConfig;
use crate::error::{OrmError, Result};
use crate::model::{EntityType, Model};
use crate::registry::TypeRegistry;
use crate::resolver::{convention_name, ModelResolver};

/// A SELECT builder whose joins exclude soft-deleted rows.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use softjoin_orm::{Builder, Model, TypeRegistry};
///
/// #[derive(Model)]
/// #[model(soft_deletes)]
/// struct Order;
///
/// #[derive(Model)]
/// struct LineItem;
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Order>()?.register::<LineItem>()?;
///
/// let sql = Builder::for_model::<LineItem>(Arc::new(registry))
///     .join("orders", ("orders.id", "=", "line_items.order_id"), Default::default(), false, false)?
///     .build_sql();
///
/// assert_eq!(
///     sql,
///     "SELECT * FROM line_items INNER JOIN orders \
///      ON orders.id = line_items.order_id AND orders.deleted_at IS NULL"
/// );
/// # Ok::<(), softjoin_orm::OrmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    query: Select,
    resolver: ModelResolver,
    model: Option<EntityType>,
    config: RewriteConfig,
}

impl Builder {
    /// Wraps a SELECT builder. Without a primary model, resolution runs
    /// without an owner hint.
    #[must_use]
    pub fn new(query: Select, resolver: ModelResolver) -> Self {
        Self {
            query,
            resolver,
            model: None,
            config: RewriteConfig::default(),
        }
    }

    /// Starts a `SELECT * FROM M::TABLE` with `M` as the primary model.
    #[must_use]
    pub fn for_model<M: Model>(registry: Arc<TypeRegistry>) -> Self {
        Self::new(Select::new(M::TABLE), ModelResolver::new(registry)).with_model(M::entity_type())
    }

    /// Sets the primary model, used as the owner hint during resolution.
    #[must_use]
    pub fn with_model(mut self, model: EntityType) -> Self {
        self.model = Some(model);
        self
    }

    /// Replaces the rewrite configuration.
    #[must_use]
    pub const fn with_config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the primary model.
    #[must_use]
    pub const fn model(&self) -> Option<&EntityType> {
        self.model.as_ref()
    }

    /// Returns the rewrite configuration.
    #[must_use]
    pub const fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Returns the resolver used to find the model behind a joined table.
    #[must_use]
    pub const fn model_resolver(&self) -> &ModelResolver {
        &self.resolver
    }

    /// Returns the resolver mutably, for registering strategies.
    pub const fn model_resolver_mut(&mut self) -> &mut ModelResolver {
        &mut self.resolver
    }

    /// Appends a resolution strategy, consulted after the naming convention.
    pub fn register_resolution_strategy<F>(&mut self, strategy: F) -> &mut Self
    where
        F: Fn(&str, Option<&EntityType>) -> Result<Option<EntityType>> + Send + Sync + 'static,
    {
        self.resolver.register_strategy(strategy);
        self
    }

    /// Adds a join, excluding soft-deleted rows of the joined table.
    ///
    /// With `with_trash`, or when the joined table resolves to no model or to
    /// a model that is not soft-deletable, the join is passed to
    /// [`Select::join`] exactly as given. Otherwise the predicate (key
    /// triple, filter triple or closure) becomes
    /// `(<predicate>) AND <table>.<deleted_at> IS NULL`, the table being the
    /// alias when the join declares one.
    ///
    /// # Errors
    ///
    /// Errors from the wrapped builder and from resolution strategies are
    /// returned unchanged. In strict mode, a table that resolves to no model
    /// fails with [`OrmError::ModelNotFound`].
    pub fn join(
        mut self,
        table: impl Into<TableRef>,
        on: impl Into<JoinOn>,
        kind: JoinKind,
        is_filter_join: bool,
        with_trash: bool,
    ) -> Result<Self> {
        let table = table.into().render(self.query.dialect())?;
        let on = on.into();

        let target = if with_trash {
            trace!(table = %table, "join requested with trashed rows");
            None
        } else {
            self.soft_delete_target(&table)?
        };

        self.query = match target {
            None => self.query.join(table, on, kind, is_filter_join)?,
            Some(entity) => {
                let (_, qualifier) = split_alias(&table);
                let deleted_at = entity.qualified_deleted_at(qualifier);
                debug!(
                    table = %table,
                    entity = entity.name(),
                    column = %deleted_at,
                    "excluding soft-deleted rows from join"
                );
                let original = on.into_clause(is_filter_join);
                let predicate = if original.is_empty() {
                    original
                } else {
                    JoinClause::new().nested(original).where_null(&deleted_at)
                };
                self.query
                    .join(table.as_str(), JoinOn::clause(move |_| predicate), kind, false)?
            }
        };
        Ok(self)
    }

    /// Adds a LEFT JOIN; see [`Builder::join`].
    ///
    /// # Errors
    ///
    /// Same as [`Builder::join`].
    pub fn left_join(
        self,
        table: impl Into<TableRef>,
        on: impl Into<JoinOn>,
        with_trash: bool,
    ) -> Result<Self> {
        self.join(table, on, JoinKind::Left, false, with_trash)
    }

    /// Adds a RIGHT JOIN; see [`Builder::join`].
    ///
    /// # Errors
    ///
    /// Same as [`Builder::join`].
    pub fn right_join(
        self,
        table: impl Into<TableRef>,
        on: impl Into<JoinOn>,
        with_trash: bool,
    ) -> Result<Self> {
        self.join(table, on, JoinKind::Right, false, with_trash)
    }

    /// Adds a FULL JOIN; see [`Builder::join`].
    ///
    /// # Errors
    ///
    /// Same as [`Builder::join`].
    pub fn full_join(
        self,
        table: impl Into<TableRef>,
        on: impl Into<JoinOn>,
        with_trash: bool,
    ) -> Result<Self> {
        self.join(table, on, JoinKind::Full, false, with_trash)
    }

    /// Resolves the rendered join `table` to the entity that owns it.
    ///
    /// An alias is ignored and identifier quotes are removed before
    /// resolution. When nothing resolves, one leading marker character is
    /// stripped and resolution is retried.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures.
    pub fn resolve_table(&self, table: &str) -> Result<Option<EntityType>> {
        let name = self.base_name(table);
        let owner = self.model.as_ref();

        let entity = self.resolver.resolve(name, owner)?;
        if entity.is_some() {
            return Ok(entity);
        }
        match self.strip_marker(name) {
            Some(unmarked) => {
                trace!(table = name, unmarked, "retrying resolution without marker");
                self.resolver.resolve(unmarked, owner)
            }
            None => Ok(None),
        }
    }

    /// Returns the soft-deletable entity owning `table`, if there is one.
    ///
    /// Resolution follows [`Builder::resolve_table`].
    ///
    /// # Errors
    ///
    /// Propagates strategy failures; in strict mode, an unresolved table is
    /// [`OrmError::ModelNotFound`].
    pub fn soft_delete_target(&self, table: &str) -> Result<Option<EntityType>> {
        let name = self.base_name(table);
        match self.resolve_table(table)? {
            Some(entity) if entity.supports_soft_delete() => Ok(Some(entity)),
            Some(entity) => {
                trace!(table = name, entity = entity.name(), "model is not soft-deletable");
                Ok(None)
            }
            None if self.config.strict => Err(OrmError::ModelNotFound(String::from(name))),
            None => {
                debug!(table = name, "no model owns joined table; joining without soft-delete filter");
                Ok(None)
            }
        }
    }

    fn base_name<'t>(&self, table: &'t str) -> &'t str {
        let (name, _) = split_alias(table);
        name.trim_matches(self.query.dialect().identifier_quote())
    }

    /// Drops one leading marker character when the convention name of
    /// `table` starts with the configured marker, compared ignoring case.
    fn strip_marker<'t>(&self, table: &'t str) -> Option<&'t str> {
        let marker = self.config.alias_marker?;
        let studly = convention_name(table).chars().next()?;
        let first = table.chars().next()?;
        if !studly.eq_ignore_ascii_case(&marker) || !first.eq_ignore_ascii_case(&marker) {
            return None;
        }
        Some(&table[first.len_utf8()..]).filter(|rest| !rest.is_empty())
    }

    /// Specifies the columns to select.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.query = self.query.columns(cols);
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.query = self.query.distinct();
        self
    }

    /// Adds a WHERE condition.
    #[must_use]
    pub fn where_clause(mut self, expr: ExprBuilder) -> Self {
        self.query = self.query.where_clause(expr);
        self
    }

    /// Adds an ORDER BY column; a `-` prefix sorts descending.
    #[must_use]
    pub fn order_by(mut self, spec: &str) -> Self {
        self.query = self.query.order_by(spec);
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.query = self.query.limit(n);
        self
    }

    /// Adds an OFFSET clause.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.query = self.query.offset(n);
        self
    }

    /// Returns the wrapped SELECT builder.
    #[must_use]
    pub const fn query(&self) -> &Select {
        &self.query
    }

    /// Unwraps the SELECT builder.
    #[must_use]
    pub fn into_inner(self) -> Select {
        self.query
    }

    /// Builds the statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.query.build()
    }

    /// Builds the statement and returns only the SQL string.
    #[must_use]
    pub fn build_sql(self) -> String {
        self.query.build_sql()
    }
}
