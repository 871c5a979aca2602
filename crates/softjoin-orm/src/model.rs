//! Model trait and entity descriptors.
//!
//! A `Model` declares, at compile time, the table it owns and whether its
//! rows are soft-deleted. An `EntityType` is the runtime descriptor built
//! from that declaration (or from a manifest), and is what the registry and
//! resolver hand around.

use std::borrow::Cow;

use serde::Deserialize;

/// A database model.
///
/// Usually implemented with `#[derive(Model)]`:
///
/// ```
/// use softjoin_orm::{EntityType, Model};
///
/// #[derive(Model)]
/// #[model(soft_deletes)]
/// struct Order {
///     id: i64,
/// }
///
/// let entity = EntityType::of::<Order>();
/// assert_eq!(entity.table(), "orders");
/// assert!(entity.supports_soft_delete());
/// ```
pub trait Model: 'static {
    /// Entity name in studly caps (`LineItem`).
    const NAME: &'static str;

    /// The SQL table name.
    const TABLE: &'static str;

    /// Relation namespace the entity lives in, if any.
    const NAMESPACE: Option<&'static str> = None;

    /// Whether rows are soft-deleted instead of removed.
    const SOFT_DELETES: bool = false;

    /// The nullable timestamp column marking a row deleted.
    const DELETED_AT: &'static str = "deleted_at";

    /// Returns the descriptor for this model.
    fn entity_type() -> EntityType
    where
        Self: Sized,
    {
        EntityType::of::<Self>()
    }
}

fn default_deleted_at() -> Cow<'static, str> {
    Cow::Borrowed("deleted_at")
}

/// Runtime descriptor of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct EntityType {
    name: Cow<'static, str>,
    table: Cow<'static, str>,
    #[serde(default)]
    namespace: Option<Cow<'static, str>>,
    #[serde(default)]
    soft_deletes: bool,
    #[serde(default = "default_deleted_at")]
    deleted_at: Cow<'static, str>,
}

impl EntityType {
    /// Creates a descriptor without capabilities.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            namespace: None,
            soft_deletes: false,
            deleted_at: default_deleted_at(),
        }
    }

    /// Returns the descriptor declared by `M`.
    #[must_use]
    pub fn of<M: Model>() -> Self {
        Self {
            name: Cow::Borrowed(M::NAME),
            table: Cow::Borrowed(M::TABLE),
            namespace: M::NAMESPACE.map(Cow::Borrowed),
            soft_deletes: M::SOFT_DELETES,
            deleted_at: Cow::Borrowed(M::DELETED_AT),
        }
    }

    /// Places the entity in a relation namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<Cow<'static, str>>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Marks the entity as soft-deletable.
    #[must_use]
    pub const fn with_soft_deletes(mut self) -> Self {
        self.soft_deletes = true;
        self
    }

    /// Sets the deleted-at column.
    #[must_use]
    pub fn with_deleted_at(mut self, column: impl Into<Cow<'static, str>>) -> Self {
        self.deleted_at = column.into();
        self
    }

    /// Returns the entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table the entity owns.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the relation namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns whether the entity declares the soft-delete capability.
    #[must_use]
    pub const fn supports_soft_delete(&self) -> bool {
        self.soft_deletes
    }

    /// Returns the deleted-at column name.
    #[must_use]
    pub fn deleted_at(&self) -> &str {
        &self.deleted_at
    }

    /// Returns `qualifier.deleted_at`.
    #[must_use]
    pub fn qualified_deleted_at(&self, qualifier: &str) -> String {
        format!("{qualifier}.{}", self.deleted_at)
    }

    /// Returns `namespace::Name`, or the bare name outside a namespace.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}::{}", self.name),
            None => self.name.to_string(),
        }
    }
}
