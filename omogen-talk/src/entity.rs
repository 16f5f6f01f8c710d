//! Domain entities backed by an ordered attribute map
//!
//! An entity is either new (mutations land in its attributes) or existing
//! (mutations land in a separate changes map so that a save only sends the
//! changed fields).

use std::sync::Arc;

use crate::descriptor::EntityDescriptor;
use crate::value::{Record, Value, record_to_json};

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    descriptor: Arc<EntityDescriptor>,
    attributes: Record,
    changes: Record,
    exists: bool,
}

impl Entity {
    /// Create an empty, new entity
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self::from_attributes(descriptor, Record::new())
    }

    /// Create a new entity holding the given attributes
    pub fn from_attributes(descriptor: Arc<EntityDescriptor>, attributes: Record) -> Self {
        Self {
            descriptor,
            attributes,
            changes: Record::new(),
            exists: false,
        }
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn shared_descriptor(&self) -> Arc<EntityDescriptor> {
        Arc::clone(&self.descriptor)
    }

    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    pub fn changes(&self) -> &Record {
        &self.changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Whether the entity is known to exist on the remote store
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Route further mutations to the changes map
    pub fn mark_existing(&mut self) {
        self.exists = true;
    }

    /// Builder-style variant of [`Entity::mark_existing`]
    pub fn existing(mut self) -> Self {
        self.exists = true;
        self
    }

    /// Identifier stored under the primary key, if any
    pub fn id(&self) -> Option<&str> {
        self.attributes
            .get(&self.descriptor.primary_key)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(Value::as_entity)
    }

    /// Pending value of a field, falling back to the stored attribute
    pub fn current(&self, name: &str) -> Option<&Value> {
        self.changes.get(name).or_else(|| self.attributes.get(name))
    }

    /// Mutate a field: attributes when new, changes when existing
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if self.exists {
            self.changes.insert(name.into(), value.into());
        } else {
            self.attributes.insert(name.into(), value.into());
        }
    }

    /// Write straight into the attributes, bypassing change tracking
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn set_attributes(&mut self, attributes: Record) {
        self.attributes = attributes;
    }

    /// Fields a save has to send: the changes for an update, everything otherwise
    pub fn pending(&self) -> &Record {
        if self.has_changes() {
            &self.changes
        } else {
            &self.attributes
        }
    }

    /// Record a successful write
    pub(crate) fn persisted(&mut self, id: Option<&str>) {
        let changes = std::mem::take(&mut self.changes);
        self.attributes.extend(changes);
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.attributes.insert(
                self.descriptor.primary_key.clone(),
                Value::String(id.to_string()),
            );
        }
        self.exists = true;
    }

    pub fn to_json(&self) -> serde_json::Value {
        record_to_json(&self.attributes)
    }
}

/// Declare a typed wrapper around [`Entity`] with one getter per field
///
/// ```rust,ignore
/// omogen_talk::entity_type! {
///     pub struct Patient {
///         class: "#C12",
///         class_name: "Patient",
///         primary_key: "id",
///         fields { last_name => "Nom", first_name => "Prénom" }
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity_type {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            class: $class:expr,
            class_name: $class_name:expr,
            primary_key: $pk:expr,
            fields { $($field:ident => $remote:expr),* $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::Entity);

        impl $name {
            pub fn descriptor() -> $crate::EntityDescriptor {
                $crate::EntityDescriptor::new($class, $class_name, $pk).with_conversions(
                    $crate::ConversionTable::symmetric([$((stringify!($field), $remote)),*]),
                )
            }

            pub fn from_entity(entity: $crate::Entity) -> Option<Self> {
                (entity.descriptor().class_name == $class_name).then(|| Self(entity))
            }

            pub fn entity(&self) -> &$crate::Entity {
                &self.0
            }

            pub fn entity_mut(&mut self) -> &mut $crate::Entity {
                &mut self.0
            }

            pub fn into_entity(self) -> $crate::Entity {
                self.0
            }

            $(
                pub fn $field(&self) -> Option<&$crate::Value> {
                    self.0.get(stringify!($field))
                }
            )*
        }
    };
}
