//! Default component factory
//!
//! Lifecycle:
//! 1. [`DefaultFactory::register`] collects raw instances
//! 2. [`Factory::prepare_components`] builds metadata, injects container
//!    handles and runs every definition registry post processor
//! 3. [`Factory::refresh`] creates the post processors, then every eager singleton
//! 4. lookups create lazy singletons and prototypes on demand
//! 5. [`Factory::close`] invokes every created closer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashSet;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, error, info};
use wirekit_application::{
    ComponentPostProcessor, Configure, ConfigureAware, DefinitionRegistry,
    DefinitionRegistryAware, DefinitionRegistryPostProcessor, Factory,
    InstantiationAwarePostProcessor, SmartInstantiationAwarePostProcessor,
};
use wirekit_domain::{
    CloserComponent, Error, Instance, Meta, Predicate, Property, Result, query,
};

use super::delegate::RegistrationDelegate;
use super::order::sort_by_order;
use crate::processors::builtin_processors;
use crate::registry::{DefaultDefinitionRegistry, SingletonComponentRegistry, SingletonRegistry};

pub struct DefaultFactory {
    configure: Arc<dyn Configure>,
    singletons: SingletonRegistry,
    definitions: Arc<DefaultDefinitionRegistry>,
    components: SingletonComponentRegistry,
    prototypes_in_creation: DashSet<String>,
    delegate: OnceLock<Arc<RegistrationDelegate>>,
    allow_circular_references: bool,
    prepared: AtomicBool,
}

impl DefaultFactory {
    /// An empty factory; no processors are registered
    pub fn new(configure: Arc<dyn Configure>) -> Self {
        Self {
            configure,
            singletons: SingletonRegistry::new(),
            definitions: Arc::new(DefaultDefinitionRegistry::new()),
            components: SingletonComponentRegistry::new(),
            prototypes_in_creation: DashSet::new(),
            delegate: OnceLock::new(),
            allow_circular_references: true,
            prepared: AtomicBool::new(false),
        }
    }

    /// A factory with every built-in processor registered
    pub fn with_builtin_processors(configure: Arc<dyn Configure>) -> Self {
        let factory = Self::new(configure);
        for processor in builtin_processors() {
            factory.register(processor);
        }
        factory
    }

    /// Whether singletons may be handed out before they are complete, default `true`
    #[must_use]
    pub fn allow_circular_references(mut self, allow: bool) -> Self {
        self.allow_circular_references = allow;
        self
    }

    /// Register a component
    ///
    /// # Panics
    ///
    /// When a different instance is already registered under the same name,
    /// or the container has already been prepared.
    pub fn register(&self, instance: Instance) {
        if let Err(err) = self.try_register(instance) {
            panic!("{err}");
        }
    }

    /// Register a component, reporting conflicts as errors
    pub fn try_register(&self, instance: Instance) -> Result<String> {
        if self.prepared.load(Ordering::Acquire) {
            let (name, _) = Meta::component_name(&instance);
            return Err(Error::component(
                name,
                "cannot register after the container was prepared",
            ));
        }
        self.singletons.register_singleton(instance)
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.load(Ordering::Acquire)
    }

    /// Names of the singletons created so far, sorted
    pub fn singleton_names(&self) -> Vec<String> {
        self.components.singleton_names()
    }

    fn delegate(&self) -> Result<Arc<RegistrationDelegate>> {
        self.delegate
            .get()
            .cloned()
            .ok_or_else(|| Error::internal("components were not prepared"))
    }

    fn inject_aware(&self, metas: &[Arc<Meta>]) {
        let registry: Arc<dyn DefinitionRegistry> = self.definitions.clone();
        for meta in metas {
            if let Some(aware) = meta.raw().cast::<dyn ConfigureAware>() {
                aware.set_configure(Arc::clone(&self.configure));
            }
            if let Some(aware) = meta.raw().cast::<dyn DefinitionRegistryAware>() {
                aware.set_definition_registry(Arc::clone(&registry));
            }
        }
    }

    fn post_process_definitions(&self, metas: &[Arc<Meta>]) -> Result<()> {
        let mut processors = self
            .definitions
            .get_metas(&query::implements::<dyn DefinitionRegistryPostProcessor>());
        sort_by_order(&mut processors);
        for processor_meta in &processors {
            let Some(processor) = processor_meta
                .instance()
                .cast::<dyn DefinitionRegistryPostProcessor>()
            else {
                continue;
            };
            let registry = self.definitions.as_ref();
            let errors: Vec<Error> = metas
                .par_iter()
                .filter_map(|meta| {
                    processor
                        .post_process_definition_registry(registry, meta)
                        .err()
                        .map(|err| Error::post_processor(processor_meta.name(), meta.name(), err))
                })
                .collect();
            Error::from_many(errors)?;
        }
        Ok(())
    }

    fn build_delegate(&self) -> RegistrationDelegate {
        let predicate = query::or([
            query::implements::<dyn ComponentPostProcessor>(),
            query::implements::<dyn InstantiationAwarePostProcessor>(),
            query::implements::<dyn SmartInstantiationAwarePostProcessor>(),
        ]);
        let mut processors = self.definitions.get_metas(&predicate);
        sort_by_order(&mut processors);
        RegistrationDelegate::new(&processors)
    }

    /// The created component called `name`, creating it if needed
    fn get_meta_component(&self, name: &str) -> Result<Arc<Meta>> {
        if let Some(meta) = self
            .components
            .get_singleton(name, self.allow_circular_references)?
        {
            return Ok(meta);
        }
        let meta = self
            .definitions
            .get_meta_by_name(name)
            .ok_or_else(|| Error::not_found(format!("component `{name}`")))?;
        self.create_component(&meta)
    }

    fn create_component(&self, meta: &Arc<Meta>) -> Result<Arc<Meta>> {
        let name = meta.name();
        if meta.is_prototype() {
            return self.create_prototype(meta);
        }

        self.components.before_singleton_creation(name)?;
        let result = self.do_create(name, meta, true);
        self.components.after_singleton_creation(name);
        match result {
            Ok(created) => {
                self.components.add_singleton(name, Arc::clone(&created));
                debug!(component = name, proxy = created.is_proxy(), "Created singleton");
                Ok(created)
            }
            Err(err) => {
                self.components.remove_singleton(name);
                Err(Error::creation(name, err))
            }
        }
    }

    fn create_prototype(&self, meta: &Arc<Meta>) -> Result<Arc<Meta>> {
        let name = meta.name();
        if !self.prototypes_in_creation.insert(name.to_string()) {
            return Err(Error::circular_reference(
                name,
                self.prototypes_in_creation
                    .iter()
                    .map(|n| n.key().clone())
                    .sorted()
                    .join(", "),
            ));
        }
        let result = meta
            .raw()
            .fresh()
            .ok_or_else(|| Error::internal(format!("prototype `{name}` has no constructor")))
            .and_then(|raw| self.do_create(name, &meta.with_raw(raw), false));
        self.prototypes_in_creation.remove(name);
        result.map_err(|err| Error::creation(name, err))
    }

    fn do_create(&self, name: &str, meta: &Arc<Meta>, singleton: bool) -> Result<Arc<Meta>> {
        let delegate = self.delegate()?;
        if let Some(replaced) = delegate.resolve_before_instantiation(meta, name)? {
            return Ok(replaced);
        }

        let early_exposure = singleton && self.allow_circular_references;
        if early_exposure {
            let early_delegate = Arc::clone(&delegate);
            let early_meta = Arc::clone(meta);
            self.components.add_singleton_factory(
                name,
                Box::new(move || early_delegate.early_component_reference(&early_meta)),
            );
        }

        self.populate(name, meta, &delegate)?;
        let exposed = delegate.initialize_component(name, meta)?;

        if early_exposure {
            if let Some(early) = self.components.early_singleton(name) {
                if exposed.instance().ptr_eq(meta.instance()) {
                    return Ok(early);
                }
                if !early.instance().ptr_eq(exposed.instance()) {
                    let dependents: Vec<String> = meta
                        .depended_on()
                        .into_iter()
                        .filter(|d| !self.components.is_singleton_currently_in_creation(d))
                        .collect();
                    if !dependents.is_empty() {
                        return Err(Error::inconsistent_early_exposure(name, dependents));
                    }
                }
            }
        }
        Ok(exposed)
    }

    /// Run property processors on a working copy of the properties, then bind
    fn populate(&self, name: &str, meta: &Arc<Meta>, delegate: &RegistrationDelegate) -> Result<()> {
        let mut properties: Vec<Property> = meta.properties();
        for property in &mut properties {
            property.injects.clear();
        }
        delegate.resolve_after_instantiation(meta, name, &mut properties)?;

        for property in properties.iter_mut().filter(|p| p.is_component()) {
            let injects = std::mem::take(&mut property.injects);
            if injects.is_empty() {
                continue;
            }
            let dependencies = injects
                .iter()
                .map(|inject| {
                    self.get_meta_component(inject.name())
                        .map(|created| created.instance().clone())
                })
                .collect::<Result<Vec<_>>>()?;
            property.bind_components(meta.raw(), &dependencies)?;
        }
        Ok(())
    }
}

impl Factory for DefaultFactory {
    fn prepare_components(&self) -> Result<()> {
        if self.prepared.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        for (name, alias, instance) in self.singletons.entries() {
            self.definitions.register_named(&name, alias, instance)?;
        }
        let metas = self.definitions.metas();
        self.inject_aware(&metas);
        self.post_process_definitions(&metas)?;
        for meta in &metas {
            meta.with_properties(|properties| properties.sort_by_key(|p| p.position));
        }

        let delegate = self.build_delegate();
        debug!(processors = ?delegate.processor_names(), "Post processors ordered");
        let _ = self.delegate.set(Arc::new(delegate));
        info!(components = metas.len(), "Components prepared");
        Ok(())
    }

    fn refresh(&self) -> Result<()> {
        self.prepare_components()?;
        let delegate = self.delegate()?;
        for name in delegate.processor_names() {
            self.get_meta_component(name)?;
        }

        let eager: Vec<Arc<Meta>> = self
            .definitions
            .metas()
            .into_iter()
            .filter(|meta| !meta.is_lazy() && !meta.is_prototype())
            .sorted_by(|a, b| a.name().cmp(b.name()))
            .collect();
        for meta in &eager {
            self.get_meta_component(meta.name())?;
        }
        info!(singletons = self.components.singleton_names().len(), "Container refreshed");
        Ok(())
    }

    fn get_component_by_name(&self, name: &str) -> Result<Instance> {
        self.prepare_components()?;
        self.get_meta_component(name)
            .map(|meta| meta.instance().clone())
    }

    fn get_components(&self, predicate: &Predicate) -> Result<Vec<Instance>> {
        self.prepare_components()?;
        self.definitions
            .get_metas(predicate)
            .iter()
            .map(|meta| {
                self.get_meta_component(meta.name())
                    .map(|created| created.instance().clone())
            })
            .collect()
    }

    fn definition_registry(&self) -> Arc<dyn DefinitionRegistry> {
        self.definitions.clone()
    }

    fn configure(&self) -> Arc<dyn Configure> {
        Arc::clone(&self.configure)
    }

    fn close(&self) {
        let closers: Vec<(String, Arc<dyn CloserComponent>)> = self
            .components
            .singletons()
            .iter()
            .filter_map(|meta| {
                meta.raw()
                    .cast::<dyn CloserComponent>()
                    .map(|closer| (meta.name().to_string(), closer))
            })
            .collect();
        closers.par_iter().for_each(|(name, closer)| {
            if let Err(err) = closer.close() {
                error!(component = %name, error = %err, "Failed to close component");
            }
        });
        info!(closed = closers.len(), "Container closed");
    }
}

impl std::fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultFactory")
            .field("registered", &self.singletons.len())
            .field("components", &self.components)
            .field("allow_circular_references", &self.allow_circular_references)
            .field("prepared", &self.is_prepared())
            .finish_non_exhaustive()
    }
}
