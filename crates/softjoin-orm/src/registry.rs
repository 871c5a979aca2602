//! Registry of entity types.
//!
//! The registry is populated once at startup and then shared read-only
//! (usually behind an `Arc`) by every resolver built from it.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{OrmError, Result};
use crate::model::{EntityType, Model};

type Key = (Option<String>, String);

/// Entity types keyed by name, optionally within a relation namespace.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<EntityType>,
    index: HashMap<Key, usize>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the entity declared by `M`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::DuplicateEntity`] if an entity with the same name
    /// is already registered in the same namespace.
    pub fn register<M: Model>(&mut self) -> Result<&mut Self> {
        self.register_type(M::entity_type())
    }

    /// Registers an entity descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::DuplicateEntity`] if an entity with the same name
    /// is already registered in the same namespace.
    pub fn register_type(&mut self, entity: EntityType) -> Result<&mut Self> {
        let key = (
            entity.namespace().map(String::from),
            String::from(entity.name()),
        );
        if self.index.contains_key(&key) {
            return Err(OrmError::DuplicateEntity(entity.qualified_name()));
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entity);
        Ok(self)
    }

    /// Looks up an entity by name.
    ///
    /// When `owner` lives in a relation namespace, that namespace is searched
    /// first; the global (namespace-less) entities are searched after it.
    #[must_use]
    pub fn get(&self, name: &str, owner: Option<&EntityType>) -> Option<&EntityType> {
        let scoped = owner
            .and_then(EntityType::namespace)
            .and_then(|ns| self.find(Some(ns), name));
        scoped.or_else(|| self.find(None, name))
    }

    fn find(&self, namespace: Option<&str>, name: &str) -> Option<&EntityType> {
        let key = (namespace.map(String::from), String::from(name));
        self.index.get(&key).map(|&idx| &self.entries[idx])
    }

    /// Returns the first registered entity that declares `table`.
    #[must_use]
    pub fn by_table(&self, table: &str) -> Option<&EntityType> {
        self.entries.iter().find(|entity| entity.table() == table)
    }

    /// Returns the registered entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityType> {
        self.entries.iter()
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<EntityType> for TypeRegistry {
    /// Collects descriptors; on a duplicate the first registration is kept.
    fn from_iter<I: IntoIterator<Item = EntityType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entity in iter {
            if let Err(err) = registry.register_type(entity) {
                debug!(%err, "skipping duplicate entity");
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_type(EntityType::new("Order", "orders").with_soft_deletes())
            .unwrap()
            .register_type(EntityType::new("Note", "notes"))
            .unwrap()
            .register_type(
                EntityType::new("Note", "billing_notes")
                    .in_namespace("billing")
                    .with_soft_deletes(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_global_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("Order", None).unwrap().table(), "orders");
        assert!(registry.get("Missing", None).is_none());
    }

    #[test]
    fn test_owner_namespace_is_searched_first() {
        let registry = registry();
        let invoice = EntityType::new("Invoice", "invoices").in_namespace("billing");
        assert_eq!(
            registry.get("Note", Some(&invoice)).unwrap().table(),
            "billing_notes"
        );
        assert_eq!(registry.get("Note", None).unwrap().table(), "notes");
        // Falls back to the global entity outside the owner's namespace.
        assert_eq!(
            registry.get("Order", Some(&invoice)).unwrap().table(),
            "orders"
        );
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let err = registry
            .register_type(EntityType::new("Note", "other_notes").in_namespace("billing"))
            .unwrap_err();
        assert_eq!(err.to_string(), "entity `billing::Note` is already registered");
    }

    #[test]
    fn test_by_table_keeps_registration_order() {
        let registry: TypeRegistry = [
            EntityType::new("Person", "people"),
            EntityType::new("Member", "people"),
            EntityType::new("Person", "persons"),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.by_table("people").unwrap().name(), "Person");
        assert!(registry.by_table("persons").is_none());
        let names: Vec<&str> = registry.iter().map(EntityType::name).collect();
        assert_eq!(names, ["Person", "Member"]);
    }
}
