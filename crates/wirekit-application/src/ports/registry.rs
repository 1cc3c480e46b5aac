use std::sync::Arc;

use wirekit_domain::{Instance, Meta, MetaId, Predicate, Result};

/// Every component definition known to the container
///
/// Registration order is preserved and is the order queries return matches in.
pub trait DefinitionRegistry: Send + Sync {
    /// Register `instance` under its component name
    ///
    /// Registering the same instance twice is a no-op; a different instance
    /// under an existing name is a `DuplicateComponent` error.
    fn register_meta(&self, instance: Instance) -> Result<Arc<Meta>>;

    fn get_meta_by_name(&self, name: &str) -> Option<Arc<Meta>>;

    fn get_meta(&self, id: MetaId) -> Option<Arc<Meta>>;

    /// The component called `name`, registering `constructor()` under that name if absent
    ///
    /// `constructor` runs while the name is reserved and must not call back into the registry.
    fn get_meta_or_register(
        &self,
        name: &str,
        constructor: &dyn Fn() -> Instance,
    ) -> Result<Arc<Meta>>;

    /// Every component matching `predicate`
    fn get_metas(&self, predicate: &Predicate) -> Vec<Arc<Meta>>;

    fn metas(&self) -> Vec<Arc<Meta>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
