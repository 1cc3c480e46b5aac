//! Application bootstrap
//!
//! [`AppBuilder`] collects components and configuration, then builds a
//! refreshed container. [`AppBuilder::run`] additionally invokes every
//! [`ApplicationRunner`] in order.

use std::ops::Deref;
use std::sync::Arc;

use tracing::{debug, info};
use wirekit_application::{ApplicationRunner, Configure, Factory};
use wirekit_domain::{Error, Instance, Result, query};
use wirekit_infrastructure::factory::sort_by_order;
use wirekit_infrastructure::{ConfigLoader, ConfigTree, DefaultFactory, LoggingConfig, init_logging};

/// Builder for [`App`]
#[derive(Default)]
pub struct AppBuilder {
    components: Vec<Instance>,
    configure: Option<Arc<dyn Configure>>,
    loader: Option<ConfigLoader>,
    logging: Option<LoggingConfig>,
    allow_circular_references: Option<bool>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component
    #[must_use]
    pub fn component(mut self, instance: impl Into<Instance>) -> Self {
        self.components.push(instance.into());
        self
    }

    #[must_use]
    pub fn components(mut self, instances: impl IntoIterator<Item = Instance>) -> Self {
        self.components.extend(instances);
        self
    }

    /// Use an already loaded configuration source
    #[must_use]
    pub fn configure(mut self, configure: Arc<dyn Configure>) -> Self {
        self.configure = Some(configure);
        self
    }

    /// Load configuration with `loader`; ignored when [`configure`](Self::configure) is set
    #[must_use]
    pub fn config_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Install a global tracing subscriber while building
    #[must_use]
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    #[must_use]
    pub fn allow_circular_references(mut self, allow: bool) -> Self {
        self.allow_circular_references = Some(allow);
        self
    }

    /// Register every component, prepare and refresh the container
    pub fn build(self) -> Result<App> {
        if let Some(logging) = &self.logging {
            init_logging(logging)?;
        }
        let configure: Arc<dyn Configure> = match (self.configure, self.loader) {
            (Some(configure), _) => configure,
            (None, Some(loader)) => Arc::new(loader.load()?),
            (None, None) => Arc::new(ConfigTree::new()),
        };

        let mut factory = DefaultFactory::with_builtin_processors(configure);
        if let Some(allow) = self.allow_circular_references {
            factory = factory.allow_circular_references(allow);
        }
        for instance in self.components {
            let name = factory.try_register(instance)?;
            debug!(component = %name, "Component registered");
        }
        factory.refresh()?;
        Ok(App { factory })
    }

    /// [`build`](Self::build), then invoke every application runner
    pub fn run(self) -> Result<App> {
        let app = self.build()?;
        app.run_runners()?;
        Ok(app)
    }
}

/// A refreshed container
///
/// Dereferences to [`DefaultFactory`], so every [`Factory`] and
/// [`FactoryExt`](wirekit_application::FactoryExt) lookup is available.
pub struct App {
    factory: DefaultFactory,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn factory(&self) -> &DefaultFactory {
        &self.factory
    }

    /// Invoke every [`ApplicationRunner`] in order; the first failure stops the run
    pub fn run_runners(&self) -> Result<()> {
        let mut runners = self
            .factory
            .definition_registry()
            .get_metas(&query::implements::<dyn ApplicationRunner>());
        sort_by_order(&mut runners);
        for meta in &runners {
            let instance = self.factory.get_component_by_name(meta.name())?;
            let runner = instance.cast::<dyn ApplicationRunner>().ok_or_else(|| {
                Error::component(meta.name(), "exposed instance is no longer a runner")
            })?;
            info!(runner = meta.name(), "Running application runner");
            runner
                .run()
                .map_err(|err| Error::component(meta.name(), format!("runner failed: {err}")))?;
        }
        Ok(())
    }

    /// Invoke every closer
    pub fn close(&self) {
        self.factory.close();
    }
}

impl Deref for App {
    type Target = DefaultFactory;

    fn deref(&self) -> &Self::Target {
        &self.factory
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("factory", &self.factory).finish()
    }
}
