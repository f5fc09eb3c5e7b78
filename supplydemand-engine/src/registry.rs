//! Registries and scoped overrides
//!
//! A [`Registry`] maps capability names to suppliers. Once handed to a
//! resolution step it is never mutated: nested scopes derive their own
//! registry through [`Registry::merge`], which copies the base mapping
//! and leaves every other handle on the old one untouched.

use crate::supplier::Supplier;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Mapping from capability name to supplier
pub struct Registry<D, R> {
    suppliers: Arc<HashMap<String, Supplier<D, R>>>,
}

impl<D, R> Registry<D, R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Registry {
            suppliers: Arc::new(HashMap::new()),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, supplier: Supplier<D, R>) -> Self {
        self.insert(name, supplier);
        self
    }

    /// Insert or replace a supplier
    ///
    /// Copy-on-write: clones of this registry that were handed out earlier
    /// keep seeing the old mapping.
    pub fn insert(&mut self, name: impl Into<String>, supplier: Supplier<D, R>) {
        Arc::make_mut(&mut self.suppliers).insert(name.into(), supplier);
    }

    /// Look up a supplier by exact capability name
    pub fn get(&self, name: &str) -> Option<&Supplier<D, R>> {
        self.suppliers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.suppliers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    /// Registered capability names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.suppliers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Derive the registry for a nested resolution
    ///
    /// Applies `clear`, then `remove`, then `add`, whatever order the
    /// override was built in. A no-op override shares storage with `self`.
    pub fn merge(&self, overrides: &RegistryOverride<D, R>) -> Self {
        if overrides.is_noop() {
            return self.clone();
        }

        let mut merged = if overrides.clear {
            HashMap::with_capacity(overrides.add.len())
        } else {
            (*self.suppliers).clone()
        };

        for name in &overrides.remove {
            merged.remove(name);
        }

        for (name, supplier) in &overrides.add {
            merged.insert(name.clone(), supplier.clone());
        }

        Registry {
            suppliers: Arc::new(merged),
        }
    }

    /// Whether both handles point at the same mapping
    pub fn shares_storage_with(&self, other: &Registry<D, R>) -> bool {
        Arc::ptr_eq(&self.suppliers, &other.suppliers)
    }
}

impl<D, R> Clone for Registry<D, R> {
    fn clone(&self) -> Self {
        Registry {
            suppliers: Arc::clone(&self.suppliers),
        }
    }
}

impl<D, R> Default for Registry<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R, S: Into<String>> FromIterator<(S, Supplier<D, R>)> for Registry<D, R> {
    fn from_iter<I: IntoIterator<Item = (S, Supplier<D, R>)>>(iter: I) -> Self {
        Registry {
            suppliers: Arc::new(
                iter.into_iter()
                    .map(|(name, supplier)| (name.into(), supplier))
                    .collect(),
            ),
        }
    }
}

impl<D, R> fmt::Debug for Registry<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

/// Declarative transformation of a registry for one nested demand
pub struct RegistryOverride<D, R> {
    /// Drop every inherited entry first
    pub clear: bool,

    /// Names to delete; missing names are ignored
    pub remove: HashSet<String>,

    /// Entries to insert or replace, applied last
    pub add: HashMap<String, Supplier<D, R>>,
}

impl<D, R> RegistryOverride<D, R> {
    pub fn new() -> Self {
        RegistryOverride {
            clear: false,
            remove: HashSet::new(),
            add: HashMap::new(),
        }
    }

    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.remove.insert(name.into());
        self
    }

    pub fn add(mut self, name: impl Into<String>, supplier: Supplier<D, R>) -> Self {
        self.add.insert(name.into(), supplier);
        self
    }

    /// True when merging would leave the registry as it is
    pub fn is_noop(&self) -> bool {
        !self.clear && self.remove.is_empty() && self.add.is_empty()
    }
}

impl<D, R> Default for RegistryOverride<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R> Clone for RegistryOverride<D, R> {
    fn clone(&self) -> Self {
        RegistryOverride {
            clear: self.clear,
            remove: self.remove.clone(),
            add: self.add.clone(),
        }
    }
}

impl<D, R> fmt::Debug for RegistryOverride<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remove: Vec<&String> = self.remove.iter().collect();
        remove.sort_unstable();
        let mut add: Vec<&String> = self.add.keys().collect();
        add.sort_unstable();

        f.debug_struct("RegistryOverride")
            .field("clear", &self.clear)
            .field("remove", &remove)
            .field("add", &add)
            .finish()
    }
}
