//! Candidate discovery for component properties
//!
//! Each processor appends to `Property::injects`; filtering happens later in
//! [`DependencyFurtherMatchingProcessor`](super::DependencyFurtherMatchingProcessor).

use std::sync::Arc;

use tracing::trace;
use wirekit_application::{DefinitionRegistry, DefinitionRegistryAware, InstantiationAwarePostProcessor};
use wirekit_domain::constants::{ARG_RETURNS, FUNC_TAG, WIRE_TAG};
use wirekit_domain::{
    Error, Instance, Meta, Ordered, PriorityOrdered, Property, Result, component, query,
};

use super::{RegistryHandle, builtin_processor};
use crate::constants::{
    ORDER_DEPENDENCY_FUNCTION, ORDER_DEPENDENCY_INTERFACE, ORDER_DEPENDENCY_NAME,
    ORDER_DEPENDENCY_TYPE,
};

fn wire_properties(properties: &mut [Property]) -> impl Iterator<Item = &mut Property> {
    properties
        .iter_mut()
        .filter(|p| p.is_component() && p.tag == WIRE_TAG)
}

fn record(component: &str, property: &mut Property, found: Vec<Arc<Meta>>, by: &str) {
    if !found.is_empty() {
        trace!(
            component,
            property = %property.id(),
            by,
            candidates = ?found.iter().map(|m| m.name()).collect::<Vec<_>>(),
            "Found dependency candidates"
        );
        property.injects.extend(found);
    }
}

macro_rules! registry_aware {
    ($processor:ty) => {
        impl DefinitionRegistryAware for $processor {
            fn set_definition_registry(&self, registry: Arc<dyn DefinitionRegistry>) {
                self.registry.set(registry);
            }
        }

        impl $processor {
            pub fn instance() -> Instance {
                component!(
                    Self::default();
                    dyn InstantiationAwarePostProcessor,
                    dyn DefinitionRegistryAware,
                    dyn Ordered,
                    dyn PriorityOrdered
                )
            }
        }
    };
}

/// `wire:"name"` resolves the component registered under that name
#[derive(Default)]
pub struct DependencyNameProcessor {
    registry: RegistryHandle,
}

registry_aware!(DependencyNameProcessor);
builtin_processor!(DependencyNameProcessor, ORDER_DEPENDENCY_NAME);

impl InstantiationAwarePostProcessor for DependencyNameProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        let registry = self.registry.get()?;
        for property in wire_properties(properties).filter(|p| !p.tag_value.is_empty()) {
            let found = registry.get_meta_by_name(&property.tag_value).into_iter().collect();
            record(name, property, found, "name");
        }
        Ok(())
    }
}

/// Unnamed `wire` fields of a concrete type
#[derive(Default)]
pub struct DependencyTypeProcessor {
    registry: RegistryHandle,
}

registry_aware!(DependencyTypeProcessor);
builtin_processor!(DependencyTypeProcessor, ORDER_DEPENDENCY_TYPE);

impl InstantiationAwarePostProcessor for DependencyTypeProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        let registry = self.registry.get()?;
        for property in wire_properties(properties).filter(|p| p.tag_value.is_empty()) {
            if let Some(target) = property.target() {
                let found = registry.get_metas(&query::type_id(target.id));
                record(name, property, found, "type");
            }
        }
        Ok(())
    }
}

/// Unnamed `wire` fields of an interface type
#[derive(Default)]
pub struct DependencyInterfaceProcessor {
    registry: RegistryHandle,
}

registry_aware!(DependencyInterfaceProcessor);
builtin_processor!(DependencyInterfaceProcessor, ORDER_DEPENDENCY_INTERFACE);

impl InstantiationAwarePostProcessor for DependencyInterfaceProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        let registry = self.registry.get()?;
        for property in wire_properties(properties).filter(|p| p.tag_value.is_empty()) {
            if let Some(target) = property.target() {
                let found = registry.get_metas(&query::interface_id(target.id));
                record(name, property, found, "interface");
            }
        }
        Ok(())
    }
}

/// `func:"name,returns=a|b"` matches components whose function returns one of the values
#[derive(Default)]
pub struct DependencyFunctionProcessor {
    registry: RegistryHandle,
}

registry_aware!(DependencyFunctionProcessor);
builtin_processor!(DependencyFunctionProcessor, ORDER_DEPENDENCY_FUNCTION);

impl InstantiationAwarePostProcessor for DependencyFunctionProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        let registry = self.registry.get()?;
        for property in properties
            .iter_mut()
            .filter(|p| p.is_component() && p.tag == FUNC_TAG)
        {
            if property.tag_value.is_empty() {
                return Err(Error::binding(property.id(), "func tag needs a function name"));
            }
            let Some(target) = property.target() else {
                continue;
            };
            let expected: Vec<String> = property
                .args
                .values_flat(ARG_RETURNS)
                .iter()
                .flat_map(|value| value.split('|'))
                .map(str::to_string)
                .collect();
            let predicate = query::and([
                query::func_name_and_result(&property.tag_value, expected),
                query::assignable_to(target.id),
            ]);
            let found = registry.get_metas(&predicate);
            record(name, property, found, "function");
        }
        Ok(())
    }
}
