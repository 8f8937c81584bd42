use crate::{
    query::resolver::{Fields, Normalizer},
    value::{Document, Value},
};
use derive_more::Deref;
use serde::{Serialize, Serializer};
use std::sync::Arc;

///
/// Smash
///
/// Ordered map whose writes and reads go through field resolution.
/// Aliases and canonical names address the same entry; localized fields
/// carry a locale suffix. Base storage for `Selector`, `Options` and the
/// documents evolved by `Pipeline`.
///
/// Mutation is explicit; `Smash` does not expose `DerefMut` so resolution
/// cannot be bypassed by accident.
///

#[derive(Clone, Debug, Default, Deref)]
pub struct Smash {
    #[deref]
    entries: Document,
    fields: Fields,
}

impl Smash {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self {
            entries: Document::new(),
            fields,
        }
    }

    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Resolved storage name and normalizer for a raw key.
    ///
    /// Operator keys (`$and`, `$where`, ...) are never resolved.
    #[must_use]
    pub fn storage_pair(&self, key: &str) -> (String, Option<Arc<dyn Normalizer>>) {
        if key.starts_with('$') {
            return (key.to_string(), None);
        }

        let resolved = self.fields.storage_pair(key);
        let name = self
            .fields
            .localized_key(&resolved.name, resolved.normalizer.as_ref());

        (name, resolved.normalizer)
    }

    /// Read by alias or canonical name, falling back to the raw key.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let (name, _) = self.storage_pair(key);

        self.entries.get(&name).or_else(|| self.entries.get(key))
    }

    /// Remove by alias or canonical name, falling back to the raw key.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let (name, _) = self.storage_pair(key);

        self.entries
            .remove(&name)
            .or_else(|| self.entries.remove(key))
    }

    /// Write under the already-resolved name, without evolving the value.
    pub(crate) fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name, value);
    }

    /// Swap the stored entries wholesale, keeping the resolution context.
    pub(crate) fn replace_entries(&mut self, entries: Document) -> Document {
        std::mem::replace(&mut self.entries, entries)
    }

    #[must_use]
    pub const fn as_document(&self) -> &Document {
        &self.entries
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.entries
    }
}

impl PartialEq for Smash {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for Smash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
