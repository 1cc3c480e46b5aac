//! Flat registry of raw instances collected before the container is prepared

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use itertools::Itertools;
use tracing::debug;
use wirekit_domain::{Error, Instance, Meta, Result};

#[derive(Debug, Default)]
pub struct SingletonRegistry {
    singletons: DashMap<String, (Instance, bool)>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under its component name and return that name
    ///
    /// The same instance may be registered twice; a different one under a
    /// taken name is rejected.
    pub fn register_singleton(&self, instance: Instance) -> Result<String> {
        let (name, alias) = Meta::component_name(&instance);
        match self.singletons.entry(name) {
            Entry::Occupied(entry) => {
                if entry.get().0.ptr_eq(&instance) {
                    debug!(component = %entry.key(), "Instance already registered");
                    Ok(entry.key().clone())
                } else {
                    Err(Error::duplicate_component(entry.key()))
                }
            }
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert((instance, alias));
                debug!(component = %name, "Registered instance");
                Ok(name)
            }
        }
    }

    pub fn get_singleton(&self, name: &str) -> Option<Instance> {
        self.singletons.get(name).map(|entry| entry.0.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.singletons.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.singletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.singletons.is_empty()
    }

    /// Every `(name, alias, instance)` sorted by name
    pub fn entries(&self) -> Vec<(String, bool, Instance)> {
        self.singletons
            .iter()
            .map(|entry| (entry.key().clone(), entry.1, entry.0.clone()))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect()
    }
}
