//! Field resolution boundary.
//!
//! The surrounding model layer owns field typing; the engine only asks it
//! two things per key: what is the canonical storage name, and which
//! normalizer (if any) evolves values written under it.

use crate::value::Value;
use std::{collections::BTreeMap, fmt, sync::Arc};

///
/// Normalizer
///
/// Type-specific value coercion supplied by the model layer.
/// The engine treats it as opaque and only calls it on leaf values.
///

pub trait Normalizer: fmt::Debug + Send + Sync {
    fn evolve(&self, value: Value) -> Value;

    /// Localized fields are stored under `"<name>.<locale>"`.
    fn is_localized(&self) -> bool {
        false
    }
}

///
/// ResolvedField
///

#[derive(Clone, Debug)]
pub struct ResolvedField {
    pub name: String,
    pub normalizer: Option<Arc<dyn Normalizer>>,
}

impl ResolvedField {
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normalizer: None,
        }
    }
}

///
/// FieldResolver
///

pub trait FieldResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, key: &str) -> ResolvedField;
}

///
/// LocaleProvider
///

pub trait LocaleProvider: fmt::Debug + Send + Sync {
    fn locale(&self) -> String;
}

///
/// Passthrough
/// Identity resolver: no aliases, no normalizers.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl FieldResolver for Passthrough {
    fn resolve(&self, key: &str) -> ResolvedField {
        ResolvedField::plain(key)
    }
}

///
/// FixedLocale
///

#[derive(Clone, Debug)]
pub struct FixedLocale(pub String);

impl Default for FixedLocale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl LocaleProvider for FixedLocale {
    fn locale(&self) -> String {
        self.0.clone()
    }
}

///
/// FieldCatalog
///
/// Table-driven resolver: an alias table plus per-field normalizers keyed by
/// canonical name. Dotted paths (`"addr.city"`) alias their first segment.
///

#[derive(Clone, Debug, Default)]
pub struct FieldCatalog {
    aliases: BTreeMap<String, String>,
    normalizers: BTreeMap<String, Arc<dyn Normalizer>>,
}

impl FieldCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as another name for the canonical field `name`.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), name.into());
        self
    }

    /// Attach a normalizer to the canonical field `name`.
    #[must_use]
    pub fn normalizer(mut self, name: impl Into<String>, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizers.insert(name.into(), normalizer);
        self
    }

    fn canonical(&self, key: &str) -> String {
        if let Some(name) = self.aliases.get(key) {
            return name.clone();
        }

        match key.split_once('.') {
            Some((head, rest)) => match self.aliases.get(head) {
                Some(name) => format!("{name}.{rest}"),
                None => key.to_string(),
            },
            None => key.to_string(),
        }
    }
}

impl FieldResolver for FieldCatalog {
    fn resolve(&self, key: &str) -> ResolvedField {
        let name = self.canonical(key);
        let normalizer = self.normalizers.get(&name).cloned();

        ResolvedField { name, normalizer }
    }
}

///
/// Fields
///
/// Immutable resolution context shared by every snapshot derived from the
/// same root query. Cloning only bumps reference counts.
///

#[derive(Clone, Debug)]
pub struct Fields {
    resolver: Arc<dyn FieldResolver>,
    locale: Arc<dyn LocaleProvider>,
}

impl Default for Fields {
    fn default() -> Self {
        Self::new(Arc::new(Passthrough))
    }
}

impl Fields {
    #[must_use]
    pub fn new(resolver: Arc<dyn FieldResolver>) -> Self {
        Self {
            resolver,
            locale: Arc::new(FixedLocale::default()),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Arc<dyn LocaleProvider>) -> Self {
        self.locale = locale;
        self
    }

    /// Canonical name plus normalizer for a raw key.
    #[must_use]
    pub fn storage_pair(&self, key: &str) -> ResolvedField {
        self.resolver.resolve(key)
    }

    /// Append the locale suffix when the normalizer is localized.
    #[must_use]
    pub fn localized_key(&self, name: &str, normalizer: Option<&Arc<dyn Normalizer>>) -> String {
        match normalizer {
            Some(normalizer) if normalizer.is_localized() => {
                format!("{name}.{}", self.locale.locale())
            }
            _ => name.to_string(),
        }
    }

    /// Resolved, localized storage name for a raw key.
    #[must_use]
    pub fn database_name(&self, key: &str) -> String {
        let resolved = self.storage_pair(key);
        self.localized_key(&resolved.name, resolved.normalizer.as_ref())
    }
}
