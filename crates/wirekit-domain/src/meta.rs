//! Component metadata held by the definition registry

use std::any::TypeId;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::component::{
    LazyInit, NamingComponent, Ordered, PrimaryComponent, PriorityOrdered, QualifierComponent,
    Scope,
};
use crate::instance::Instance;
use crate::property::Property;

/// Stable index of a [`Meta`] in its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaId(usize);

impl MetaId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A registered component and everything learned about it
///
/// `instance` is what lookups expose; `raw` is the value fields are bound
/// into. They differ only for proxies produced by post processors, which
/// share the id, name, properties and dependents of the original.
pub struct Meta {
    id: MetaId,
    name: String,
    alias: bool,
    instance: Instance,
    raw: Instance,
    properties: Arc<Mutex<Vec<Property>>>,
    depended_on: Arc<Mutex<BTreeSet<String>>>,
    proxy: bool,
}

impl Meta {
    pub fn new(id: MetaId, name: String, alias: bool, instance: Instance) -> Self {
        Self {
            id,
            name,
            alias,
            raw: instance.clone(),
            instance,
            properties: Arc::new(Mutex::new(Vec::new())),
            depended_on: Arc::new(Mutex::new(BTreeSet::new())),
            proxy: false,
        }
    }

    /// Name and alias flag a component registers under
    ///
    /// Components declaring [`NamingComponent`] use that name and count as
    /// aliases; everything else is named after its type.
    pub fn component_name(instance: &Instance) -> (String, bool) {
        match instance.cast::<dyn NamingComponent>() {
            Some(naming) => (naming.naming(), true),
            None => (instance.type_name().to_string(), false),
        }
    }

    /// A proxy exposing `instance` while keeping this component's identity
    pub fn proxy(&self, instance: Instance) -> Arc<Meta> {
        Arc::new(Self {
            id: self.id,
            name: self.name.clone(),
            alias: self.alias,
            instance,
            raw: self.raw.clone(),
            properties: Arc::clone(&self.properties),
            depended_on: Arc::clone(&self.depended_on),
            proxy: true,
        })
    }

    /// A copy bound to a freshly constructed prototype value
    pub fn with_raw(&self, raw: Instance) -> Arc<Meta> {
        Arc::new(Self {
            id: self.id,
            name: self.name.clone(),
            alias: self.alias,
            instance: raw.clone(),
            raw,
            properties: Arc::clone(&self.properties),
            depended_on: Arc::clone(&self.depended_on),
            proxy: false,
        })
    }

    pub fn id(&self) -> MetaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alias(&self) -> bool {
        self.alias
    }

    pub fn is_proxy(&self) -> bool {
        self.proxy
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn raw(&self) -> &Instance {
        &self.raw
    }

    pub fn type_id(&self) -> TypeId {
        self.raw.type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.raw.type_name()
    }

    pub fn scope(&self) -> Scope {
        self.raw.scope()
    }

    pub fn is_prototype(&self) -> bool {
        self.scope() == Scope::Prototype
    }

    pub fn is_lazy(&self) -> bool {
        self.raw.provides::<dyn LazyInit>()
    }

    pub fn is_primary(&self) -> bool {
        self.raw.provides::<dyn PrimaryComponent>()
    }

    pub fn qualifier(&self) -> Option<String> {
        self.raw
            .cast::<dyn QualifierComponent>()
            .map(|q| q.qualifier())
    }

    pub fn is_priority_ordered(&self) -> bool {
        self.raw.provides::<dyn PriorityOrdered>()
    }

    pub fn order(&self) -> Option<i32> {
        self.raw.cast::<dyn Ordered>().map(|o| o.order())
    }

    fn lock_properties(&self) -> MutexGuard<'_, Vec<Property>> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the scanned properties
    pub fn properties(&self) -> Vec<Property> {
        self.lock_properties().clone()
    }

    pub fn add_property(&self, property: Property) {
        self.lock_properties().push(property);
    }

    /// Exclusive access to the property list
    pub fn with_properties<R>(&self, f: impl FnOnce(&mut Vec<Property>) -> R) -> R {
        let mut properties = self.lock_properties();
        f(&mut *properties)
    }

    /// Record that component `name` depends on this one
    pub fn depends_by(&self, name: &str) {
        self.depended_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
    }

    /// Names of the components that depend on this one, sorted
    pub fn depended_on(&self) -> Vec<String> {
        self.depended_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.type_name())
            .field("alias", &self.alias)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}
