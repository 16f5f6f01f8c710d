//! Entity descriptors and attribute conversion tables

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Record;

/// Kind of operation a conversion applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Remote record -> local attributes
    Read,
    /// Local attributes -> remote form fields
    Write,
}

/// Per-operation field renaming between local and remote names
///
/// The read table is keyed by the remote field name and yields the local
/// one; the write table goes the other way. Fields missing from a table keep
/// their name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionTable {
    #[serde(default)]
    pub read: IndexMap<String, String>,
    #[serde(default)]
    pub write: IndexMap<String, String>,
}

/// Result of running attributes through a [`ConversionTable`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedAttributes {
    /// Attributes found in the table, under their new name
    pub converted: Record,
    /// Attributes absent from the table, under their original name
    pub unconverted: Record,
}

impl ConvertedAttributes {
    /// Flatten both buckets into one map, unconverted entries winning on collision
    pub fn merge(self) -> Record {
        let mut merged = self.converted;
        merged.extend(self.unconverted);
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.converted.is_empty() && self.unconverted.is_empty()
    }
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(local, remote)` pairs used in both directions
    pub fn symmetric<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::new();
        for (local, remote) in pairs {
            table.write.insert(local.to_string(), remote.to_string());
            table.read.insert(remote.to_string(), local.to_string());
        }
        table
    }

    pub fn with_read(mut self, remote: impl Into<String>, local: impl Into<String>) -> Self {
        self.read.insert(remote.into(), local.into());
        self
    }

    pub fn with_write(mut self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.write.insert(local.into(), remote.into());
        self
    }

    fn table(&self, kind: OperationKind) -> &IndexMap<String, String> {
        match kind {
            OperationKind::Read => &self.read,
            OperationKind::Write => &self.write,
        }
    }

    /// Converted name of a single field, if the table knows it
    pub fn lookup(&self, kind: OperationKind, name: &str) -> Option<&str> {
        self.table(kind).get(name).map(String::as_str)
    }

    /// Converted name of a field, falling back to the original name
    pub fn rename<'a>(&'a self, kind: OperationKind, name: &'a str) -> &'a str {
        self.lookup(kind, name).unwrap_or(name)
    }

    /// Partition attributes into converted and unconverted buckets
    pub fn convert(&self, kind: OperationKind, attributes: &Record) -> ConvertedAttributes {
        let table = self.table(kind);
        let mut result = ConvertedAttributes::default();

        for (key, value) in attributes {
            match table.get(key) {
                Some(renamed) => {
                    result.converted.insert(renamed.clone(), value.clone());
                }
                None => {
                    result.unconverted.insert(key.clone(), value.clone());
                }
            }
        }

        result
    }
}

/// Static description of one remote entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Remote type tag sent as `class`
    pub class: String,
    /// Remote type name, used in query clauses and as discriminator
    pub class_name: String,
    /// Primary key attribute name
    pub primary_key: String,
    /// Prepend the identifier clause to every query of this type
    #[serde(default)]
    pub id_required: bool,
    /// Always send the type tag on writes, updates included
    #[serde(default)]
    pub persist_class: bool,
    #[serde(default, flatten)]
    pub conversions: ConversionTable,
}

impl EntityDescriptor {
    pub fn new(
        class: impl Into<String>,
        class_name: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            class_name: class_name.into(),
            primary_key: primary_key.into(),
            id_required: false,
            persist_class: false,
            conversions: ConversionTable::default(),
        }
    }

    pub fn with_id_required(mut self, id_required: bool) -> Self {
        self.id_required = id_required;
        self
    }

    pub fn with_persist_class(mut self, persist_class: bool) -> Self {
        self.persist_class = persist_class;
        self
    }

    pub fn with_conversions(mut self, conversions: ConversionTable) -> Self {
        self.conversions = conversions;
        self
    }

    /// Convert attributes for an operation, optionally merged into one map
    pub fn convert(&self, kind: OperationKind, attributes: &Record) -> ConvertedAttributes {
        self.conversions.convert(kind, attributes)
    }

    /// Convert and merge a raw remote record into local attributes
    pub fn to_local(&self, record: &Record) -> Record {
        self.convert(OperationKind::Read, record).merge()
    }

    /// Remote field name used when writing a local attribute
    pub fn remote_field<'a>(&'a self, local: &'a str) -> &'a str {
        self.conversions.rename(OperationKind::Write, local)
    }
}
