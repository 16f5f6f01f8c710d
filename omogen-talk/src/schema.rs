//! Entity types declared in a TOML file
//!
//! ```toml
//! [[entity]]
//! class = "#C12"
//! class_name = "Patient"
//! primary_key = "id"
//! persist_class = true
//!
//! [entity.read]
//! Nom = "last_name"
//!
//! [entity.write]
//! last_name = "Nom"
//! ```

use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::descriptor::EntityDescriptor;
use crate::error::{OmogenError, Result};
use crate::registry::TypeRegistry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub entity: Vec<EntityDescriptor>,
}

impl Schema {
    pub fn parse(source: &str) -> Result<Self> {
        let schema: Schema = toml::from_str(source)
            .map_err(|e| OmogenError::Config(format!("Invalid entity schema: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading entity schema from {}", path.display());
        let source = tokio::fs::read_to_string(path).await?;
        Self::parse(&source)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for descriptor in &self.entity {
            if descriptor.class_name.is_empty() || descriptor.primary_key.is_empty() {
                return Err(OmogenError::Config(format!(
                    "Entity '{}' needs a class_name and a primary_key",
                    descriptor.class
                )));
            }
            if !seen.insert(descriptor.class_name.as_str()) {
                warn!(
                    "Entity '{}' declared twice, the last declaration wins",
                    descriptor.class_name
                );
            }
        }
        Ok(())
    }

    pub fn into_registry(self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for descriptor in self.entity {
            registry.register(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OperationKind;
    use std::io::Write;

    const SCHEMA: &str = r##"
        [[entity]]
        class = "#C12"
        class_name = "Patient"
        primary_key = "id"
        persist_class = true

        [entity.read]
        Nom = "last_name"

        [entity.write]
        last_name = "Nom"

        [[entity]]
        class = "#C7"
        class_name = "Ordonnance"
        primary_key = "id"
        id_required = true
    "##;

    #[test]
    fn test_parse_schema() {
        let schema = Schema::parse(SCHEMA).unwrap();
        assert_eq!(schema.entity.len(), 2);

        let patient = &schema.entity[0];
        assert!(patient.persist_class);
        assert_eq!(
            patient.conversions.lookup(OperationKind::Read, "Nom"),
            Some("last_name")
        );
        assert!(schema.entity[1].id_required);
        assert!(schema.entity[1].conversions.write.is_empty());
    }

    #[test]
    fn test_into_registry() {
        let registry = Schema::parse(SCHEMA).unwrap().into_registry();
        assert_eq!(registry.types(), vec!["Ordonnance", "Patient"]);
        assert_eq!(registry.require("Patient").unwrap().class, "#C12");
    }

    #[test]
    fn test_rejects_incomplete_entity() {
        let err = Schema::parse(
            r##"
            [[entity]]
            class = "#C1"
            class_name = ""
            primary_key = "id"
            "##,
        )
        .unwrap_err();
        assert!(matches!(err, OmogenError::Config(_)));

        let err = Schema::parse("[[entity]]\nclass = \"#C1\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid entity schema"));
    }

    #[test]
    fn test_empty_schema() {
        assert!(Schema::parse("").unwrap().into_registry().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();

        let schema = Schema::load(file.path()).await.unwrap();
        assert_eq!(schema.entity.len(), 2);
        assert_eq!(schema, Schema::parse(SCHEMA).unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Schema::load("/nonexistent/omogen-schema.toml")
            .await
            .unwrap_err();
        assert!(matches!(err, OmogenError::Io(_)));
    }
}
