//! Discriminator registry and entity materialization
//!
//! Remote records name their type in the `classe` field. The registry maps
//! that discriminator to a descriptor and a factory, and turns decoded
//! records (including embedded related records) into entities.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::constants::DISCRIMINATOR_FIELD;
use crate::descriptor::EntityDescriptor;
use crate::entity::Entity;
use crate::error::{OmogenError, Result};
use crate::value::{Record, Value};

/// Builds an entity from its descriptor and already converted attributes
pub type EntityFactory = Arc<dyn Fn(Arc<EntityDescriptor>, Record) -> Entity + Send + Sync>;

#[derive(Clone)]
struct RegistryEntry {
    descriptor: Arc<EntityDescriptor>,
    factory: EntityFactory,
}

/// Mapping from remote discriminator to entity factory, populated at start-up
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.entries.keys().collect();
        types.sort();
        f.debug_struct("TypeRegistry").field("types", &types).finish()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor with the default factory
    pub fn register(&mut self, descriptor: EntityDescriptor) -> Arc<EntityDescriptor> {
        self.register_with(descriptor, Arc::new(Entity::from_attributes))
    }

    /// Register a descriptor with a custom factory
    pub fn register_with(
        &mut self,
        descriptor: EntityDescriptor,
        factory: EntityFactory,
    ) -> Arc<EntityDescriptor> {
        let descriptor = Arc::new(descriptor);
        debug!("Registering entity type '{}'", descriptor.class_name);
        self.entries.insert(
            descriptor.class_name.clone(),
            RegistryEntry {
                descriptor: Arc::clone(&descriptor),
                factory,
            },
        );
        descriptor
    }

    pub fn descriptor(&self, discriminator: &str) -> Option<Arc<EntityDescriptor>> {
        self.entries
            .get(discriminator)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    /// Like [`TypeRegistry::descriptor`], failing for unknown types
    pub fn require(&self, discriminator: &str) -> Result<Arc<EntityDescriptor>> {
        self.descriptor(discriminator)
            .ok_or_else(|| OmogenError::UnknownEntity(discriminator.to_string()))
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.entries.contains_key(discriminator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered discriminators, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Materialize a collection of raw records
    ///
    /// Records without a discriminator, or whose discriminator is not
    /// registered, are dropped from the output.
    pub fn materialize_all<'a>(&self, records: impl IntoIterator<Item = &'a Value>) -> Vec<Entity> {
        let mut entities = Vec::new();
        for record in records {
            match self.materialize(record) {
                Some(entity) => entities.push(entity),
                None => warn!(
                    "Dropping record with unregistered type '{}'",
                    discriminator_of(record).unwrap_or("(none)")
                ),
            }
        }
        entities
    }

    /// Materialize one raw record, if its discriminator is registered
    pub fn materialize(&self, record: &Value) -> Option<Entity> {
        let Value::Record(raw) = record else {
            return None;
        };
        let entry = self.entries.get(discriminator_of(record)?)?;
        Some(self.build(entry, raw.clone()))
    }

    fn build(&self, entry: &RegistryEntry, raw: Record) -> Entity {
        let resolved: Record = raw
            .into_iter()
            .map(|(key, value)| (key, self.resolve(value)))
            .collect();
        let attributes = entry.descriptor.to_local(&resolved);
        let mut entity = (entry.factory)(Arc::clone(&entry.descriptor), attributes);
        entity.mark_existing();
        entity
    }

    /// Depth-first substitution of embedded records by entities
    ///
    /// The remote store returns trees, so no cycle guard is kept.
    fn resolve(&self, value: Value) -> Value {
        match value {
            Value::Record(raw) => {
                let entry = raw
                    .get(DISCRIMINATOR_FIELD)
                    .and_then(Value::as_str)
                    .and_then(|discriminator| self.entries.get(discriminator));
                match entry {
                    Some(entry) => Value::Entity(Box::new(self.build(entry, raw))),
                    None => Value::Record(
                        raw.into_iter()
                            .map(|(key, value)| (key, self.resolve(value)))
                            .collect(),
                    ),
                }
            }
            Value::List(items) => {
                Value::List(items.into_iter().map(|item| self.resolve(item)).collect())
            }
            other => other.cast_bool(),
        }
    }
}

fn discriminator_of(record: &Value) -> Option<&str> {
    record
        .as_record()?
        .get(DISCRIMINATOR_FIELD)
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ConversionTable;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(
            EntityDescriptor::new("#C12", "Patient", "id")
                .with_conversions(ConversionTable::symmetric([("last_name", "Nom")])),
        );
        registry.register(EntityDescriptor::new("#C3", "Utilisateur", "id"));
        registry
    }

    #[test]
    fn test_materialize_converts_and_casts() {
        let raw = Value::from_json(&json!({
            "classe": "Patient",
            "id": "P1",
            "Nom": "Dupont",
            "Actif": "Oui"
        }));

        let entity = registry().materialize(&raw).unwrap();
        assert_eq!(entity.descriptor().class_name, "Patient");
        assert_eq!(entity.id(), Some("P1"));
        assert_eq!(entity.get_str("last_name"), Some("Dupont"));
        assert_eq!(entity.get("Actif"), Some(&Value::Bool(true)));
        assert!(entity.exists());
    }

    #[test]
    fn test_unregistered_records_are_dropped() {
        let records: Vec<Value> = [
            json!({"classe": "Patient", "id": "P1"}),
            json!({"classe": "Inconnu", "id": "X1"}),
            json!({"classe": "Utilisateur", "id": "U1"}),
            json!({"classe": "Fantome", "id": "X2"}),
            json!({"id": "no-type"}),
        ]
        .iter()
        .map(Value::from_json)
        .collect();

        let entities = registry().materialize_all(&records);
        assert_eq!(entities.len(), records.len() - 3);
        let ids: Vec<_> = entities.iter().filter_map(Entity::id).collect();
        assert_eq!(ids, vec!["P1", "U1"]);
    }

    #[test]
    fn test_nested_records_become_entities() {
        let raw = Value::from_json(&json!({
            "classe": "Utilisateur",
            "id": "U1",
            "patient": {
                "classe": "Patient",
                "id": "P1",
                "Nom": "Dupont",
                "medecin": {"classe": "Inconnu", "id": "M1", "Remplacant": "Non"}
            },
            "historique": [
                {"classe": "Patient", "id": "P2"},
                "texte"
            ]
        }));

        let user = registry().materialize(&raw).unwrap();
        let patient = user.get_entity("patient").unwrap();
        assert_eq!(patient.get_str("last_name"), Some("Dupont"));

        let doctor = patient.get("medecin").unwrap().as_record().unwrap();
        assert_eq!(doctor.get("Remplacant"), Some(&Value::Bool(false)));

        let history = user.get("historique").unwrap().as_list().unwrap();
        assert_eq!(history[0].as_entity().and_then(Entity::id), Some("P2"));
        assert_eq!(history[1], Value::from("texte"));
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = TypeRegistry::new();
        registry.register_with(
            EntityDescriptor::new("#C9", "Document", "id"),
            Arc::new(|descriptor: Arc<EntityDescriptor>, mut attributes: Record| {
                attributes.insert("source".into(), Value::from("omogen"));
                Entity::from_attributes(descriptor, attributes)
            }),
        );

        let raw = Value::from_json(&json!({"classe": "Document", "id": "D1"}));
        let entity = registry.materialize(&raw).unwrap();
        assert_eq!(entity.get_str("source"), Some("omogen"));
    }

    #[test]
    fn test_require_unknown() {
        let err = registry().require("Inconnu").unwrap_err();
        assert!(matches!(err, OmogenError::UnknownEntity(name) if name == "Inconnu"));
        assert_eq!(registry().types(), vec!["Patient", "Utilisateur"]);
    }
}
