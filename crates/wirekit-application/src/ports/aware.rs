//! Setter injection of container handles
//!
//! Components declaring these capabilities receive the handle while the
//! container is prepared, before any definition processor runs.

use std::sync::Arc;

use crate::ports::configure::Configure;
use crate::ports::registry::DefinitionRegistry;

pub trait ConfigureAware: Send + Sync {
    fn set_configure(&self, configure: Arc<dyn Configure>);
}

pub trait DefinitionRegistryAware: Send + Sync {
    fn set_definition_registry(&self, registry: Arc<dyn DefinitionRegistry>);
}
