//! Bidirectional mapping between wire names and in-memory kinds.
//!
//! Every event and every placeable object travels on the wire under a
//! symbolic name (`"edit"`, `"flower-spawn-area"`, ...). The client works
//! with closed Rust enums instead. [`TypeRegistry`] is the one place that
//! translates between the two, and it is a strict bijection: no two names
//! share a kind and no two kinds share a name.
//!
//! ```text
//! "identify" ⇄ EventKind::Identify
//! "edit"     ⇄ EventKind::Edit
//! ```
//!
//! Lookups that miss return [`ProtocolError::UnknownKind`]. There is no
//! fallback kind; callers must see the miss.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::ProtocolError;

/// A bijective name ⇄ kind table.
///
/// `K` is usually a fieldless enum such as
/// [`EventKind`](crate::EventKind). It must be `Copy + Eq + Hash` so it
/// can be a map key and be handed out by value.
#[derive(Debug, Clone)]
pub struct TypeRegistry<K> {
    by_name: HashMap<String, K>,
    by_kind: HashMap<K, String>,
}

impl<K> TypeRegistry<K>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }

    /// Builds a registry from a static `(name, kind)` table.
    ///
    /// # Errors
    /// Returns [`ProtocolError::DuplicateKind`] on the first entry that
    /// breaks the bijection.
    pub fn from_table(table: &[(&str, K)]) -> Result<Self, ProtocolError> {
        let mut registry = Self::new();
        for (name, kind) in table {
            registry.register(name, *kind)?;
        }
        Ok(registry)
    }

    /// Adds a `(name, kind)` pair.
    ///
    /// # Errors
    /// Returns [`ProtocolError::DuplicateKind`] if either the name or the
    /// kind is already registered. The registry is left unchanged.
    pub fn register(
        &mut self,
        name: &str,
        kind: K,
    ) -> Result<(), ProtocolError> {
        if self.by_name.contains_key(name) {
            return Err(ProtocolError::DuplicateKind(name.to_string()));
        }
        if let Some(existing) = self.by_kind.get(&kind) {
            return Err(ProtocolError::DuplicateKind(format!(
                "{kind:?} already registered as {existing:?}"
            )));
        }
        self.by_name.insert(name.to_string(), kind);
        self.by_kind.insert(kind, name.to_string());
        Ok(())
    }

    /// Returns the wire name for `kind`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownKind`] if `kind` was never registered.
    pub fn name_of(&self, kind: K) -> Result<&str, ProtocolError> {
        self.by_kind
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| ProtocolError::UnknownKind(format!("{kind:?}")))
    }

    /// Returns the kind registered under `name`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownKind`] if `name` was never registered.
    pub fn kind_of(&self, name: &str) -> Result<K, ProtocolError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ProtocolError::UnknownKind(name.to_string()))
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterates over `(name, kind)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, K)> {
        self.by_name.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}

impl<K> Default for TypeRegistry<K>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
