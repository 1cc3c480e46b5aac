//! Port interfaces

/// Setter injection of container handles
pub mod aware;
/// Configuration lookups
pub mod configure;
/// Component factory and typed lookups
pub mod factory;
/// Post processor hooks
pub mod processors;
/// Definition registry
pub mod registry;
/// Post-refresh callbacks
pub mod runner;
/// Field discovery
pub mod scanner;

pub use aware::{ConfigureAware, DefinitionRegistryAware};
pub use configure::Configure;
pub use factory::{Factory, FactoryExt};
pub use processors::{
    ComponentPostProcessor, DefinitionRegistryPostProcessor, InstantiationAwarePostProcessor,
    SmartInstantiationAwarePostProcessor,
};
pub use registry::DefinitionRegistry;
pub use runner::ApplicationRunner;
pub use scanner::{ScannedField, Scanner};
