use wirekit_application::InstantiationAwarePostProcessor;
use wirekit_domain::{Error, Instance, Ordered, PriorityOrdered, Property, Result, component};

use super::builtin_processor;
use crate::constants::ORDER_DEPENDENCY_VALIDATE;

/// Fails required properties left without candidates and records dependents
#[derive(Debug, Default)]
pub struct DependencyValidateProcessor;

impl DependencyValidateProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn InstantiationAwarePostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(DependencyValidateProcessor, ORDER_DEPENDENCY_VALIDATE);

impl InstantiationAwarePostProcessor for DependencyValidateProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        for property in properties.iter().filter(|p| p.is_component()) {
            if property.injects.is_empty() {
                if property.required() {
                    return Err(Error::missing_dependency(property.id()));
                }
                continue;
            }
            for inject in &property.injects {
                inject.depends_by(name);
            }
        }
        Ok(())
    }
}
