//! # wirekit
//!
//! Tag-driven component wiring: register instances, describe their fields,
//! and let the container resolve dependencies, bind configuration and drive
//! every component through its lifecycle.
//!
//! ## Example
//!
//! ```ignore
//! use wirekit::prelude::*;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct English;
//! impl Component for English {}
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! #[derive(Default)]
//! struct Service {
//!     greeter: Wire<dyn Greeter>,
//!     port: Setting<u16>,
//! }
//! impl Component for Service {
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields
//!             .wire("greeter", "", |s| &s.greeter)
//!             .prop("port", "server.port:8080", |s| &s.port);
//!     }
//! }
//!
//! let app = App::builder()
//!     .component(component!(English; dyn Greeter))
//!     .component(component!(Service::default()))
//!     .run()?;
//! let service = app.get_component::<Service>()?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - metadata model, capabilities, field descriptors, errors
//! - `application` - ports: post processors, registries, configuration, runners
//! - `infrastructure` - registries, built-in processors, factory, config, logging

pub mod app;

/// Domain layer - component metadata and capabilities
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use wirekit_domain::*;
}

/// Application layer - port traits
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use wirekit_application::*;
}

/// Infrastructure layer - factory, processors, configuration and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use wirekit_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use app::{App, AppBuilder};
pub use wirekit_domain::{Error, Result, component};

/// Everything needed to declare and wire components
pub mod prelude {
    pub use crate::app::{App, AppBuilder};
    pub use wirekit_application::{
        ApplicationRunner, ComponentPostProcessor, Configure, ConfigureAware, DefinitionRegistry,
        DefinitionRegistryAware, DefinitionRegistryPostProcessor, Factory, FactoryExt,
        InstantiationAwarePostProcessor, SmartInstantiationAwarePostProcessor,
    };
    pub use wirekit_domain::{
        CloserComponent, Component, ConfigurationProperties, Error, Fields, InitializeComponent,
        InitializingComponent, Instance, LazyInit, NamingComponent, Ordered, PrimaryComponent,
        PriorityOrdered, Properties, QualifierComponent, Result, Scope, ScopeComponent, Setting,
        Wire, WireAll, component, query,
    };
    pub use wirekit_infrastructure::{ConfigLoader, ConfigTree, DefaultFactory, LoggingConfig};
}
