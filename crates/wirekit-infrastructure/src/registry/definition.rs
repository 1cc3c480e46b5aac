//! Arena of component metadata indexed by name

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use wirekit_application::DefinitionRegistry;
use wirekit_domain::{Error, Instance, Meta, MetaId, Predicate, Result};

/// Metas live in an append-only vector; names map to their index
///
/// The name map is always locked before the vector, never the other way round.
#[derive(Debug, Default)]
pub struct DefaultDefinitionRegistry {
    metas: RwLock<Vec<Arc<Meta>>>,
    names: DashMap<String, MetaId>,
}

impl DefaultDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_metas(&self) -> RwLockReadGuard<'_, Vec<Arc<Meta>>> {
        self.metas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, name: String, alias: bool, instance: Instance) -> (MetaId, Arc<Meta>) {
        let mut metas = self.metas.write().unwrap_or_else(PoisonError::into_inner);
        let id = MetaId::new(metas.len());
        let meta = Arc::new(Meta::new(id, name, alias, instance));
        metas.push(Arc::clone(&meta));
        (id, meta)
    }

    /// Register under an explicit name
    pub fn register_named(&self, name: &str, alias: bool, instance: Instance) -> Result<Arc<Meta>> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let existing = self
                    .get_meta(*entry.get())
                    .ok_or_else(|| Error::internal(format!("dangling meta index for {name}")))?;
                if existing.raw().ptr_eq(&instance) {
                    Ok(existing)
                } else {
                    Err(Error::duplicate_component(name))
                }
            }
            Entry::Vacant(entry) => {
                let (id, meta) = self.push(name.to_string(), alias, instance);
                entry.insert(id);
                Ok(meta)
            }
        }
    }
}

impl DefinitionRegistry for DefaultDefinitionRegistry {
    fn register_meta(&self, instance: Instance) -> Result<Arc<Meta>> {
        let (name, alias) = Meta::component_name(&instance);
        self.register_named(&name, alias, instance)
    }

    fn get_meta_by_name(&self, name: &str) -> Option<Arc<Meta>> {
        let id = *self.names.get(name)?;
        self.get_meta(id)
    }

    fn get_meta(&self, id: MetaId) -> Option<Arc<Meta>> {
        self.read_metas().get(id.index()).cloned()
    }

    fn get_meta_or_register(
        &self,
        name: &str,
        constructor: &dyn Fn() -> Instance,
    ) -> Result<Arc<Meta>> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(entry) => self
                .get_meta(*entry.get())
                .ok_or_else(|| Error::internal(format!("dangling meta index for {name}"))),
            Entry::Vacant(entry) => {
                let instance = constructor();
                let alias = instance.type_name() != name;
                let (id, meta) = self.push(name.to_string(), alias, instance);
                entry.insert(id);
                Ok(meta)
            }
        }
    }

    fn get_metas(&self, predicate: &Predicate) -> Vec<Arc<Meta>> {
        self.read_metas()
            .iter()
            .filter(|meta| predicate.test(meta))
            .cloned()
            .collect()
    }

    fn metas(&self) -> Vec<Arc<Meta>> {
        self.read_metas().clone()
    }

    fn len(&self) -> usize {
        self.read_metas().len()
    }
}
