//! Dispatch of component creation hooks to the registered post processors

use std::sync::Arc;

use tracing::{debug, trace};
use wirekit_application::{
    ComponentPostProcessor, InstantiationAwarePostProcessor, SmartInstantiationAwarePostProcessor,
};
use wirekit_domain::{
    Error, InitializeComponent, InitializingComponent, Instance, Meta, Property, Result,
};

type Named<P> = Vec<(String, Arc<P>)>;

/// Post processors captured once, in order, when the container is prepared
#[derive(Default)]
pub struct RegistrationDelegate {
    component: Named<dyn ComponentPostProcessor>,
    instantiation: Named<dyn InstantiationAwarePostProcessor>,
    smart: Named<dyn SmartInstantiationAwarePostProcessor>,
    names: Vec<String>,
}

impl RegistrationDelegate {
    /// `processors` must already be sorted
    pub fn new(processors: &[Arc<Meta>]) -> Self {
        let mut delegate = Self::default();
        for meta in processors {
            let instance = meta.instance();
            let name = meta.name().to_string();
            let mut matched = false;
            if let Some(p) = instance.cast::<dyn ComponentPostProcessor>() {
                delegate.component.push((name.clone(), p));
                matched = true;
            }
            if let Some(p) = instance.cast::<dyn InstantiationAwarePostProcessor>() {
                delegate.instantiation.push((name.clone(), p));
                matched = true;
            }
            if let Some(p) = instance.cast::<dyn SmartInstantiationAwarePostProcessor>() {
                delegate.smart.push((name.clone(), p));
                matched = true;
            }
            if matched {
                delegate.names.push(name);
            }
        }
        delegate
    }

    /// Names of every processor, in order
    pub fn processor_names(&self) -> &[String] {
        &self.names
    }

    /// A replacement produced before population, already past after-initialization
    pub fn resolve_before_instantiation(&self, meta: &Meta, name: &str) -> Result<Option<Arc<Meta>>> {
        for (processor, hook) in &self.instantiation {
            let replaced = hook
                .before_instantiation(meta, name)
                .map_err(|err| Error::post_processor(processor, name, err))?;
            if let Some(instance) = replaced {
                debug!(component = name, processor = %processor, "Component replaced before instantiation");
                let exposed = self.apply_after_initialization(instance, name)?;
                return Ok(Some(meta.proxy(exposed)));
            }
        }
        Ok(None)
    }

    /// Run property processing; a processor vetoing in `after_instantiation` is skipped
    pub fn resolve_after_instantiation(
        &self,
        meta: &Meta,
        name: &str,
        properties: &mut [Property],
    ) -> Result<()> {
        for (processor, hook) in &self.instantiation {
            let proceed = hook
                .after_instantiation(meta, name)
                .map_err(|err| Error::post_processor(processor, name, err))?;
            if !proceed {
                trace!(component = name, processor = %processor, "Property processing skipped");
                continue;
            }
            hook.post_process_properties(properties, meta.raw(), name)
                .map_err(|err| Error::post_processor(processor, name, err))?;
        }
        Ok(())
    }

    /// Before-initialization hooks, the component's own callbacks, then after-initialization hooks
    ///
    /// The callbacks run once each: on the value a before-initialization hook
    /// substituted when it declares the capability, otherwise on the raw component.
    pub fn initialize_component(&self, name: &str, meta: &Arc<Meta>) -> Result<Arc<Meta>> {
        let mut current = meta.instance().clone();
        for (processor, hook) in &self.component {
            match hook
                .before_initialization(&current, name)
                .map_err(|err| Error::post_processor(processor, name, err))?
            {
                Some(next) => current = next,
                None => break,
            }
        }

        let raw = meta.raw();
        if let Some(initializing) = capability::<dyn InitializingComponent>(&current, raw) {
            initializing.after_properties_set()?;
        }
        if let Some(initialize) = capability::<dyn InitializeComponent>(&current, raw) {
            initialize.init()?;
        }

        let exposed = self.apply_after_initialization(current, name)?;
        Ok(expose(meta, exposed))
    }

    /// The reference handed to components that need `meta` before it is complete
    pub fn early_component_reference(&self, meta: &Arc<Meta>) -> Result<Arc<Meta>> {
        let name = meta.name();
        let mut current = meta.instance().clone();
        for (processor, hook) in &self.smart {
            current = hook
                .early_component_reference(&current, name)
                .map_err(|err| Error::post_processor(processor, name, err))?;
        }
        debug!(component = name, "Exposed early reference");
        Ok(expose(meta, current))
    }

    fn apply_after_initialization(&self, mut current: Instance, name: &str) -> Result<Instance> {
        for (processor, hook) in &self.component {
            match hook
                .after_initialization(&current, name)
                .map_err(|err| Error::post_processor(processor, name, err))?
            {
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(current)
    }
}

fn capability<C: ?Sized + Send + Sync + 'static>(current: &Instance, raw: &Instance) -> Option<Arc<C>> {
    current.cast::<C>().or_else(|| raw.cast::<C>())
}

fn expose(meta: &Arc<Meta>, instance: Instance) -> Arc<Meta> {
    if instance.ptr_eq(meta.instance()) {
        Arc::clone(meta)
    } else {
        meta.proxy(instance)
    }
}

impl std::fmt::Debug for RegistrationDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationDelegate")
            .field("processors", &self.names)
            .finish()
    }
}
