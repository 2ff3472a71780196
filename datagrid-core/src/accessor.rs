//! Named field accessors with conventional-name resolution.
//!
//! A column named `email` resolves, in order, to an accessor registered as
//! `getEmail`, `isEmail`, `hasEmail`, `canEmail`, then `email` itself. The
//! outcome (hit or miss) is cached per field.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::entity::Entity;
use crate::value::CellValue;

/// Prefixes tried, in order, before the bare field name.
pub const ACCESSOR_PREFIXES: [&str; 4] = ["get", "is", "has", "can"];

pub type AccessorFn<T> = Arc<dyn Fn(&T) -> Result<CellValue, AccessError> + Send + Sync>;

/// Failure raised by a fallible accessor. Serialized as a `null` cell.
#[derive(Debug, Clone)]
pub struct AccessError(pub String);

impl AccessError {
    pub fn new(msg: impl Into<String>) -> Self {
        AccessError(msg.into())
    }
}

impl std::fmt::Display for AccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Accessor failed: {}", self.0)
    }
}

impl std::error::Error for AccessError {}

/// Accessor set for one entity type.
pub struct Accessors<T> {
    named: HashMap<String, AccessorFn<T>>,
    resolved: DashMap<String, Option<AccessorFn<T>>>,
}

impl<T> Accessors<T> {
    pub fn new() -> Self {
        Self {
            named: HashMap::new(),
            resolved: DashMap::new(),
        }
    }

    /// Build the accessor set declared by the entity type.
    pub fn for_entity() -> Self
    where
        T: Entity,
    {
        let mut accessors = Self::new();
        T::register_accessors(&mut accessors);
        accessors
    }

    pub fn register<F, V>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<CellValue>,
    {
        self.insert(
            name.into(),
            Arc::new(move |entity: &T| Ok::<CellValue, AccessError>(accessor(entity).into())),
        )
    }

    pub fn register_fallible<F>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&T) -> Result<CellValue, AccessError> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(accessor))
    }

    fn insert(&mut self, name: String, accessor: AccessorFn<T>) -> &mut Self {
        if self.named.insert(name.clone(), accessor).is_some() {
            tracing::warn!(accessor = %name, "Accessor registered twice, keeping the last one");
        }
        self.resolved.clear();
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    /// Resolve the accessor serving `field`, caching the result.
    ///
    /// Concurrent first resolutions of the same field may both compute the
    /// lookup; the first insert wins and both callers see the same entry.
    pub fn resolve(&self, field: &str) -> Option<AccessorFn<T>> {
        if let Some(hit) = self.resolved.get(field) {
            return hit.value().clone();
        }
        let found = self.lookup(field);
        self.resolved
            .entry(field.to_string())
            .or_insert(found)
            .value()
            .clone()
    }

    fn lookup(&self, field: &str) -> Option<AccessorFn<T>> {
        if !field.is_empty() {
            let capitalized = capitalize(field);
            for prefix in ACCESSOR_PREFIXES {
                if let Some(accessor) = self.named.get(&format!("{prefix}{capitalized}")) {
                    return Some(accessor.clone());
                }
            }
        }
        self.named.get(field).cloned()
    }

    /// Read `field` from `entity`.
    ///
    /// Returns `None` when no accessor resolves. A failing accessor yields
    /// `Some(CellValue::Null)`.
    pub fn read(&self, entity: &T, field: &str) -> Option<CellValue> {
        let accessor = self.resolve(field)?;
        match accessor(entity) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(field, error = %err, "Accessor failed, using null");
                Some(CellValue::Null)
            }
        }
    }
}

impl<T> Default for Accessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Accessors<T> {
    fn clone(&self) -> Self {
        Self {
            named: self.named.clone(),
            resolved: DashMap::new(),
        }
    }
}

impl<T> std::fmt::Debug for Accessors<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.named.keys().collect();
        names.sort();
        f.debug_struct("Accessors").field("named", &names).finish()
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
