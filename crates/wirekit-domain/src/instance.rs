//! Type-erased component handle
//!
//! An [`Instance`] owns an `Arc` of the concrete component together with
//! everything the container needs to reason about it without knowing its type:
//! the capabilities and interfaces it was declared with, its field
//! descriptions, its named functions and, for prototypes, a constructor.

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::component::{Component, Scope, ScopeComponent};
use crate::fields::{FieldSpec, Fields};

type Erased = Arc<dyn Any + Send + Sync>;
type CastFn = Arc<dyn Fn(&Erased) -> Option<Erased> + Send + Sync>;
type FunctionFn = Arc<dyn Fn(&Erased) -> Option<String> + Send + Sync>;
type Constructor = Arc<dyn Fn() -> Erased + Send + Sync>;

#[derive(Clone)]
struct Cast {
    type_name: &'static str,
    cast: CastFn,
}

/// A registered component value
#[derive(Clone)]
pub struct Instance {
    value: Erased,
    type_id: TypeId,
    type_name: &'static str,
    casts: Arc<HashMap<TypeId, Cast>>,
    fields: Arc<[FieldSpec]>,
    functions: Arc<BTreeMap<String, FunctionFn>>,
    constructor: Option<Constructor>,
}

impl Instance {
    /// Wrap a component with no declared capabilities
    pub fn new<T: Component>(value: T) -> Self {
        InstanceBuilder::new(value).build()
    }

    pub fn builder<T: Component>(value: T) -> InstanceBuilder<T> {
        InstanceBuilder::new(value)
    }

    /// Concrete type of the wrapped value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The wrapped value, downcastable to its concrete type
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// View the value as `I`, if it was declared with that capability or is of that type
    pub fn cast<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        let cast = self.casts.get(&TypeId::of::<I>())?;
        let handle = (cast.cast)(&self.value)?;
        handle.downcast_ref::<Arc<I>>().cloned()
    }

    /// Whether `cast::<I>()` would succeed
    pub fn provides<I: ?Sized + 'static>(&self) -> bool {
        self.casts.contains_key(&TypeId::of::<I>())
    }

    /// Whether the value is of type `id` or was declared with interface `id`
    pub fn assignable_to(&self, id: TypeId) -> bool {
        self.casts.contains_key(&id)
    }

    /// Whether `id` is a declared interface, excluding the concrete type
    pub fn exposes(&self, id: TypeId) -> bool {
        id != self.type_id && self.casts.contains_key(&id)
    }

    /// Names of the declared interfaces, sorted
    pub fn interface_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .casts
            .iter()
            .filter(|(id, _)| **id != self.type_id)
            .map(|(_, cast)| cast.type_name)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call the zero-argument function registered under `name`
    pub fn call_function(&self, name: &str) -> Option<String> {
        let function = self.functions.get(name)?;
        function(&self.value)
    }

    /// Prototype when built with a constructor, else whatever [`ScopeComponent`] declares
    pub fn scope(&self) -> Scope {
        if self.constructor.is_some() {
            return Scope::Prototype;
        }
        self.cast::<dyn ScopeComponent>()
            .map_or(Scope::Singleton, |declared| declared.scope())
    }

    /// A new value from the prototype constructor, sharing this instance's declarations
    pub fn fresh(&self) -> Option<Instance> {
        let constructor = self.constructor.as_ref()?;
        Some(Self {
            value: constructor(),
            ..self.clone()
        })
    }

    /// Identity comparison on the wrapped value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// Address of the wrapped value, stable for the value's lifetime
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.value).cast::<()>() as usize
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name)
            .field("interfaces", &self.interface_names())
            .field("fields", &self.fields.len())
            .field("scope", &self.scope())
            .finish()
    }
}

/// Declares the capabilities, functions and scope of a component before registration
pub struct InstanceBuilder<T> {
    value: Arc<T>,
    casts: HashMap<TypeId, Cast>,
    functions: BTreeMap<String, FunctionFn>,
    constructor: Option<Constructor>,
}

impl<T: Component> InstanceBuilder<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<T>) -> Self {
        let mut casts = HashMap::new();
        casts.insert(
            TypeId::of::<T>(),
            Cast {
                type_name: type_name::<T>(),
                cast: cast_fn::<T, T>(|c| c),
            },
        );
        Self {
            value,
            casts,
            functions: BTreeMap::new(),
            constructor: None,
        }
    }

    /// Declare that the component can be viewed as `I`
    ///
    /// The conversion is almost always the unsizing identity:
    /// `builder.implements::<dyn Greeter>(|c| c)`.
    #[must_use]
    pub fn implements<I: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    ) -> Self {
        self.casts.insert(
            TypeId::of::<I>(),
            Cast {
                type_name: type_name::<I>(),
                cast: cast_fn(cast),
            },
        );
        self
    }

    /// Register a zero-argument function used by `func` dependencies
    #[must_use]
    pub fn function<R: ToString>(
        mut self,
        name: &str,
        function: impl Fn(&T) -> R + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(
            name.to_string(),
            Arc::new(move |value: &Erased| value.downcast_ref::<T>().map(|v| function(v).to_string())),
        );
        self
    }

    /// Make the component prototype scoped; every lookup builds a new value
    #[must_use]
    pub fn prototype(mut self, constructor: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.constructor = Some(Arc::new(move || Arc::new(constructor()) as Erased));
        self
    }

    pub fn build(self) -> Instance {
        let mut fields = Fields::<T>::new();
        T::describe(&mut fields);
        Instance {
            value: self.value,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            casts: Arc::new(self.casts),
            fields: fields.into_specs().into(),
            functions: Arc::new(self.functions),
            constructor: self.constructor,
        }
    }
}

impl<T: Component> From<InstanceBuilder<T>> for Instance {
    fn from(builder: InstanceBuilder<T>) -> Self {
        builder.build()
    }
}

fn cast_fn<T, I>(cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> CastFn
where
    T: Send + Sync + 'static,
    I: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |value: &Erased| {
        let concrete = Arc::clone(value).downcast::<T>().ok()?;
        let handle: Arc<I> = cast(concrete);
        Some(Arc::new(handle) as Erased)
    })
}
