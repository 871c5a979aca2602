//! Entity manifest loading.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use softjoin_orm::{EntityType, RewriteConfig, TypeRegistry};

/// The entities an application registers, with its rewrite settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Entity descriptors, in registration order.
    pub entities: Vec<EntityType>,

    /// Join rewriting settings.
    #[serde(default)]
    pub rewrite: RewriteConfig,
}

impl Manifest {
    /// Reads a manifest from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    /// Parses a manifest from JSON text.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the registry, failing on duplicate entities.
    pub fn registry(&self) -> anyhow::Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        for entity in &self.entities {
            registry.register_type(entity.clone())?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "entities": [
            {"name": "Order", "table": "orders", "soft_deletes": true},
            {"name": "Note", "table": "billing_notes", "namespace": "billing",
             "soft_deletes": true, "deleted_at": "removed_at"},
            {"name": "Tag", "table": "tags"}
        ],
        "rewrite": {"strict": true}
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.entities.len(), 3);
        assert!(manifest.rewrite.strict);
        assert_eq!(manifest.rewrite.alias_marker, Some('Z'));

        let note = &manifest.entities[1];
        assert_eq!(note.namespace(), Some("billing"));
        assert_eq!(note.deleted_at(), "removed_at");
        assert_eq!(manifest.entities[0].deleted_at(), "deleted_at");
        assert!(!manifest.entities[2].supports_soft_delete());
    }

    #[test]
    fn test_rewrite_section_is_optional() {
        let manifest = Manifest::parse(r#"{"entities": []}"#).unwrap();
        assert_eq!(manifest.rewrite, RewriteConfig::default());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let manifest = Manifest::parse(
            r#"{"entities": [
                {"name": "Order", "table": "orders"},
                {"name": "Order", "table": "orders_v2"}
            ]}"#,
        )
        .unwrap();
        let err = manifest.registry().unwrap_err();
        assert_eq!(err.to_string(), "entity `Order` is already registered");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Manifest::parse(r#"{"entities": [], "models": []}"#).is_err());
    }
}
