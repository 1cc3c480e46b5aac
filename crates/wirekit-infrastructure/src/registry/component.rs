//! Three-tier singleton cache
//!
//! 1. `singleton_objects`: fully created components
//! 2. `early_singleton_objects`: references handed out while a component is
//!    still being created, produced from tier 3 on first request
//! 3. `singleton_factories`: deferred producers of early references
//!
//! A name lives in at most one tier at a time.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use itertools::Itertools;
use wirekit_domain::{Error, Meta, Result};

/// Produces the early reference of a component under creation
pub type SingletonFactory = Box<dyn FnOnce() -> Result<Arc<Meta>> + Send + Sync>;

#[derive(Default)]
pub struct SingletonComponentRegistry {
    singleton_objects: DashMap<String, Arc<Meta>>,
    early_singleton_objects: DashMap<String, Arc<Meta>>,
    singleton_factories: DashMap<String, SingletonFactory>,
    singletons_in_creation: DashSet<String>,
}

impl SingletonComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look `name` up across the tiers
    ///
    /// Tiers 2 and 3 are consulted only when `allow_early` is set and the
    /// component is currently in creation. A factory is removed from its tier
    /// before it runs, and its result is promoted to tier 2.
    pub fn get_singleton(&self, name: &str, allow_early: bool) -> Result<Option<Arc<Meta>>> {
        if let Some(meta) = self.singleton_objects.get(name) {
            return Ok(Some(Arc::clone(meta.value())));
        }
        if !allow_early || !self.is_singleton_currently_in_creation(name) {
            return Ok(None);
        }
        if let Some(meta) = self.early_singleton_objects.get(name) {
            return Ok(Some(Arc::clone(meta.value())));
        }
        let Some((_, factory)) = self.singleton_factories.remove(name) else {
            return Ok(None);
        };
        let early = factory()?;
        self.early_singleton_objects
            .insert(name.to_string(), Arc::clone(&early));
        Ok(Some(early))
    }

    /// The early reference of `name`, if one was handed out
    pub fn early_singleton(&self, name: &str) -> Option<Arc<Meta>> {
        self.early_singleton_objects
            .get(name)
            .map(|meta| Arc::clone(meta.value()))
    }

    /// Store a fully created component, clearing the other tiers
    pub fn add_singleton(&self, name: &str, meta: Arc<Meta>) {
        self.singleton_objects.insert(name.to_string(), meta);
        self.early_singleton_objects.remove(name);
        self.singleton_factories.remove(name);
    }

    /// Store an early reference producer unless the component already exists
    pub fn add_singleton_factory(&self, name: &str, factory: SingletonFactory) {
        if self.singleton_objects.contains_key(name) {
            return;
        }
        self.singleton_factories.insert(name.to_string(), factory);
        self.early_singleton_objects.remove(name);
    }

    pub fn remove_singleton(&self, name: &str) {
        self.singleton_objects.remove(name);
        self.early_singleton_objects.remove(name);
        self.singleton_factories.remove(name);
    }

    /// Mark `name` as in creation; fails if it already is
    pub fn before_singleton_creation(&self, name: &str) -> Result<()> {
        if self.singletons_in_creation.insert(name.to_string()) {
            Ok(())
        } else {
            Err(Error::circular_reference(
                name,
                self.singletons_in_creation
                    .iter()
                    .map(|n| n.key().clone())
                    .sorted()
                    .join(", "),
            ))
        }
    }

    pub fn after_singleton_creation(&self, name: &str) {
        self.singletons_in_creation.remove(name);
    }

    pub fn is_singleton_currently_in_creation(&self, name: &str) -> bool {
        self.singletons_in_creation.contains(name)
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singleton_objects.contains_key(name)
    }

    /// Names of the fully created singletons, sorted
    pub fn singleton_names(&self) -> Vec<String> {
        self.singleton_objects
            .iter()
            .map(|entry| entry.key().clone())
            .sorted()
            .collect()
    }

    /// Every fully created singleton, sorted by name
    pub fn singletons(&self) -> Vec<Arc<Meta>> {
        self.singleton_objects
            .iter()
            .sorted_by(|a, b| a.key().cmp(b.key()))
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl std::fmt::Debug for SingletonComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonComponentRegistry")
            .field("singletons", &self.singleton_objects.len())
            .field("early", &self.early_singleton_objects.len())
            .field("factories", &self.singleton_factories.len())
            .field("in_creation", &self.singletons_in_creation.len())
            .finish()
    }
}
