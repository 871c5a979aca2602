//! Table-to-model resolution.
//!
//! A [`ModelResolver`] holds an ordered chain of [`ResolutionStrategy`]s. The
//! naming convention always comes first; strategies registered later act as
//! fallbacks for tables the convention cannot map. The first strategy that
//! returns an entity wins.
//!
//! Not finding a model is a normal outcome (`Ok(None)`), not an error.
//!
//! ```
//! use std::sync::Arc;
//!
//! use softjoin_orm::{EntityType, ModelResolver, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register_type(EntityType::new("LineItem", "line_items"))?;
//!
//! let mut resolver = ModelResolver::new(Arc::new(registry));
//! assert_eq!(resolver.resolve("line_items", None)?.unwrap().name(), "LineItem");
//! assert!(resolver.resolve("legacy_items", None)?.is_none());
//!
//! resolver.register_strategy(|table, _owner| {
//!     Ok((table == "legacy_items").then(|| EntityType::new("LegacyItem", "legacy_items")))
//! });
//! assert_eq!(resolver.resolve("legacy_items", None)?.unwrap().name(), "LegacyItem");
//! # Ok::<(), softjoin_orm::OrmError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::inflector;
use crate::model::EntityType;
use crate::registry::TypeRegistry;

/// A rule mapping a table to the entity that owns it.
///
/// `owner` is the primary entity of the query being built, when known. It
/// lets a strategy prefer entities in the owner's relation namespace.
pub trait ResolutionStrategy: Send + Sync {
    /// Returns the owning entity, or `None` if this rule does not apply.
    ///
    /// # Errors
    ///
    /// Strategy failures are propagated to the caller of
    /// [`ModelResolver::resolve`] unchanged.
    fn resolve(&self, table: &str, owner: Option<&EntityType>) -> Result<Option<EntityType>>;
}

impl<F> ResolutionStrategy for F
where
    F: Fn(&str, Option<&EntityType>) -> Result<Option<EntityType>> + Send + Sync,
{
    fn resolve(&self, table: &str, owner: Option<&EntityType>) -> Result<Option<EntityType>> {
        self(table, owner)
    }
}

/// The entity name the naming convention derives from a table:
/// `line_items` → `LineItem`.
#[must_use]
pub fn convention_name(table: &str) -> String {
    inflector::studly(&inflector::singular(table))
}

/// Resolves a table to the registered entity named by the convention.
#[derive(Debug, Clone)]
pub struct ConventionStrategy {
    registry: Arc<TypeRegistry>,
}

impl ConventionStrategy {
    /// Creates the strategy over a registry.
    #[must_use]
    pub const fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

impl ResolutionStrategy for ConventionStrategy {
    fn resolve(&self, table: &str, owner: Option<&EntityType>) -> Result<Option<EntityType>> {
        Ok(self.registry.get(&convention_name(table), owner).cloned())
    }
}

/// Resolves a table to the registered entity that declares it as its table.
///
/// Covers entities whose table does not follow the naming convention. Not
/// part of the default chain; register it to opt in.
#[derive(Debug, Clone)]
pub struct DeclaredTableStrategy {
    registry: Arc<TypeRegistry>,
}

impl DeclaredTableStrategy {
    /// Creates the strategy over a registry.
    #[must_use]
    pub const fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

impl ResolutionStrategy for DeclaredTableStrategy {
    fn resolve(&self, table: &str, _owner: Option<&EntityType>) -> Result<Option<EntityType>> {
        Ok(self.registry.by_table(table).cloned())
    }
}

/// An ordered chain of resolution strategies.
///
/// Cloning is cheap: strategies and the registry are shared.
#[derive(Clone)]
pub struct ModelResolver {
    registry: Arc<TypeRegistry>,
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl ModelResolver {
    /// Creates a resolver whose chain holds only the naming convention.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let convention = ConventionStrategy::new(Arc::clone(&registry));
        Self {
            registry,
            strategies: vec![Arc::new(convention)],
        }
    }

    /// Returns the registry the convention looks entities up in.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Appends a closure strategy to the fallback chain.
    pub fn register_strategy<F>(&mut self, strategy: F) -> &mut Self
    where
        F: Fn(&str, Option<&EntityType>) -> Result<Option<EntityType>> + Send + Sync + 'static,
    {
        self.register(strategy)
    }

    /// Appends a strategy object to the fallback chain.
    pub fn register<S: ResolutionStrategy + 'static>(&mut self, strategy: S) -> &mut Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Returns the number of strategies, the naming convention included.
    #[must_use]
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Resolves `table` to its owning entity.
    ///
    /// # Errors
    ///
    /// Returns the error of the first strategy that fails; later strategies
    /// are not consulted.
    pub fn resolve(&self, table: &str, owner: Option<&EntityType>) -> Result<Option<EntityType>> {
        for (position, strategy) in self.strategies.iter().enumerate() {
            if let Some(entity) = strategy.resolve(table, owner)? {
                trace!(table, entity = entity.name(), position, "resolved model");
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for ModelResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelResolver")
            .field("entities", &self.registry.len())
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    fn resolver() -> ModelResolver {
        let mut registry = TypeRegistry::new();
        registry
            .register_type(EntityType::new("Order", "orders").with_soft_deletes())
            .unwrap()
            .register_type(EntityType::new("Person", "people"))
            .unwrap()
            .register_type(EntityType::new("Account", "tbl_accounts"))
            .unwrap();
        ModelResolver::new(Arc::new(registry))
    }

    #[test]
    fn test_convention_name() {
        assert_eq!(convention_name("orders"), "Order");
        assert_eq!(convention_name("line_items"), "LineItem");
        assert_eq!(convention_name("people"), "Person");
        assert_eq!(convention_name("zusers"), "Zuser");
    }

    #[test]
    fn test_convention_resolves() {
        let resolver = resolver();
        assert_eq!(resolver.strategy_count(), 1);
        assert_eq!(resolver.resolve("orders", None).unwrap().unwrap().name(), "Order");
        assert_eq!(resolver.resolve("people", None).unwrap().unwrap().name(), "Person");
        assert!(resolver.resolve("tbl_accounts", None).unwrap().is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let first = resolver.resolve("orders", None).unwrap();
        let second = resolver.resolve("orders", None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_convention_wins_over_custom_strategy() {
        let mut resolver = resolver();
        resolver.register_strategy(|_, _| Ok(Some(EntityType::new("Impostor", "orders"))));
        assert_eq!(resolver.resolve("orders", None).unwrap().unwrap().name(), "Order");
        // The fallback answers for everything the convention misses.
        assert_eq!(resolver.resolve("unknown", None).unwrap().unwrap().name(), "Impostor");
    }

    #[test]
    fn test_custom_strategies_run_in_registration_order() {
        let mut resolver = resolver();
        resolver
            .register_strategy(|table, _| {
                Ok((table == "legacy").then(|| EntityType::new("First", "legacy")))
            })
            .register_strategy(|_, _| Ok(Some(EntityType::new("Second", "legacy"))));
        assert_eq!(resolver.strategy_count(), 3);
        assert_eq!(resolver.resolve("legacy", None).unwrap().unwrap().name(), "First");
    }

    #[test]
    fn test_declared_table_strategy() {
        let mut resolver = resolver();
        let registry = Arc::new(resolver.registry().clone());
        resolver.register(DeclaredTableStrategy::new(registry));
        assert_eq!(
            resolver.resolve("tbl_accounts", None).unwrap().unwrap().name(),
            "Account"
        );
    }

    #[test]
    fn test_strategy_error_propagates() {
        let mut resolver = resolver();
        resolver
            .register_strategy(|_, _| Err(OrmError::Strategy(String::from("lookup failed"))))
            .register_strategy(|_, _| Ok(Some(EntityType::new("Never", "never"))));
        let err = resolver.resolve("unknown", None).unwrap_err();
        assert!(matches!(err, OrmError::Strategy(msg) if msg == "lookup failed"));
        // Tables the convention resolves never reach the failing strategy.
        assert!(resolver.resolve("orders", None).is_ok());
    }

    #[test]
    fn test_owner_hint_reaches_strategies() {
        let mut resolver = resolver();
        resolver.register_strategy(|table, owner| {
            Ok(owner
                .filter(|o| o.namespace() == Some("billing"))
                .map(|_| EntityType::new("BillingNote", table.to_owned())))
        });
        let invoice = EntityType::new("Invoice", "invoices").in_namespace("billing");
        assert!(resolver.resolve("notes", None).unwrap().is_none());
        assert_eq!(
            resolver.resolve("notes", Some(&invoice)).unwrap().unwrap().name(),
            "BillingNote"
        );
    }
}
