use std::any::{TypeId, type_name};
use std::sync::Arc;

use wirekit_domain::{Error, Instance, Predicate, Result, query};

use crate::ports::configure::Configure;
use crate::ports::registry::DefinitionRegistry;

/// The component container
pub trait Factory: Send + Sync {
    /// Build metadata for every registered component and run definition processors
    fn prepare_components(&self) -> Result<()>;

    /// Create post processors, then every non-lazy singleton
    fn refresh(&self) -> Result<()>;

    /// The exposed instance of the component called `name`, creating it on demand
    fn get_component_by_name(&self, name: &str) -> Result<Instance>;

    /// The exposed instances of every component matching `predicate`
    fn get_components(&self, predicate: &Predicate) -> Result<Vec<Instance>>;

    fn definition_registry(&self) -> Arc<dyn DefinitionRegistry>;

    fn configure(&self) -> Arc<dyn Configure>;

    /// Invoke every closer; failures are logged
    fn close(&self);
}

/// Typed lookups on top of [`Factory`]
pub trait FactoryExt: Factory {
    /// The single component assignable to `I`, preferring a primary one
    fn get_component<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>> {
        let predicate = query::assignable_to(TypeId::of::<I>());
        let mut metas = self.definition_registry().get_metas(&predicate);
        let meta = match metas.len() {
            0 => return Err(Error::not_found(format!("component of type {}", type_name::<I>()))),
            1 => metas.remove(0),
            _ => {
                let mut primaries: Vec<_> = metas.iter().filter(|m| m.is_primary()).cloned().collect();
                if primaries.len() != 1 {
                    return Err(Error::ambiguous(
                        type_name::<I>(),
                        metas.iter().map(|m| m.name().to_string()).collect(),
                    ));
                }
                primaries.remove(0)
            }
        };
        cast_instance(&self.get_component_by_name(meta.name())?)
    }

    /// Every component assignable to `I`
    fn get_components_of<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>> {
        self.get_components(&query::assignable_to(TypeId::of::<I>()))?
            .iter()
            .map(|instance| cast_instance::<I>(instance))
            .collect()
    }

    /// The component called `name`, viewed as `I`
    fn get_component_as<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<I>> {
        cast_instance(&self.get_component_by_name(name)?)
    }
}

impl<F: Factory + ?Sized> FactoryExt for F {}

fn cast_instance<I: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Result<Arc<I>> {
    instance.cast::<I>().ok_or_else(|| {
        Error::binding(
            instance.type_name(),
            format!("component cannot be viewed as {}", type_name::<I>()),
        )
    })
}
