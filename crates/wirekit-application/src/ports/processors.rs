//! Post processor hooks
//!
//! A post processor is a regular component declaring one or more of these
//! capabilities. Processors are ordered by tier (`PriorityOrdered`, then
//! `Ordered`, then the rest), then by order value, then by name.

use wirekit_domain::{Instance, Meta, Property, Result};

use crate::ports::registry::DefinitionRegistry;

/// Runs once per registered component while the container is prepared
///
/// Invocations for different components may run concurrently.
pub trait DefinitionRegistryPostProcessor: Send + Sync {
    fn post_process_definition_registry(
        &self,
        registry: &dyn DefinitionRegistry,
        meta: &Meta,
    ) -> Result<()>;
}

/// Hooks around the component's own initialization callbacks
///
/// Returning `Ok(None)` stops the chain and keeps the value it received.
pub trait ComponentPostProcessor: Send + Sync {
    fn before_initialization(&self, component: &Instance, _name: &str) -> Result<Option<Instance>> {
        Ok(Some(component.clone()))
    }

    fn after_initialization(&self, component: &Instance, _name: &str) -> Result<Option<Instance>> {
        Ok(Some(component.clone()))
    }
}

/// Hooks around field population
pub trait InstantiationAwarePostProcessor: Send + Sync {
    /// A replacement for the component; the first one returned wins and skips population
    fn before_instantiation(&self, _meta: &Meta, _name: &str) -> Result<Option<Instance>> {
        Ok(None)
    }

    /// `false` skips this processor's [`post_process_properties`](Self::post_process_properties)
    fn after_instantiation(&self, _meta: &Meta, _name: &str) -> Result<bool> {
        Ok(true)
    }

    fn post_process_properties(
        &self,
        _properties: &mut [Property],
        _component: &Instance,
        _name: &str,
    ) -> Result<()> {
        Ok(())
    }
}

/// Supplies the reference handed out while a component is still being created
pub trait SmartInstantiationAwarePostProcessor: Send + Sync {
    fn early_component_reference(&self, component: &Instance, _name: &str) -> Result<Instance> {
        Ok(component.clone())
    }
}
