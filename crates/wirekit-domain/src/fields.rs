//! Injectable field slots and their type-erased descriptions
//!
//! Components hold their dependencies in [`Wire`], [`WireAll`] and [`Setting`]
//! slots and describe them once per type through [`Component::describe`]. Each
//! description carries a binder closure that knows the concrete owner and slot
//! types, so the container can assign resolved values without reflection.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::component::{Component, ConfigurationProperties};
use crate::constants::{FUNC_TAG, PREFIX_TAG, PROP_TAG, VALUE_TAG, WIRE_TAG};
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::instance::Instance;

type WireBinder = Arc<dyn Fn(&dyn Any, &[Instance]) -> Result<()> + Send + Sync>;
type ValueBinder = Arc<dyn Fn(&dyn Any, &str, bool) -> Result<()> + Send + Sync>;
type StructValidator<V> = fn(&V) -> std::result::Result<(), String>;

/// A single injected component
pub struct Wire<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Wire<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_wired(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set(&self, value: Arc<T>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

impl<T: ?Sized> Default for Wire<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Wire<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wire")
            .field("target", &type_name::<T>())
            .field("wired", &self.is_wired())
            .finish()
    }
}

/// Every injected component matching the target
pub struct WireAll<T: ?Sized> {
    slot: RwLock<Vec<Arc<T>>>,
}

impl<T: ?Sized> WireAll<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Vec<Arc<T>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn set(&self, values: Vec<Arc<T>>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = values;
    }
}

impl<T: ?Sized> Default for WireAll<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for WireAll<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireAll")
            .field("target", &type_name::<T>())
            .field("len", &self.len())
            .finish()
    }
}

/// A configuration value decoded into `V`
pub struct Setting<V> {
    slot: RwLock<Option<V>>,
}

impl<V> Setting<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<V>
    where
        V: Clone,
    {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Borrow the bound value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }

    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set(&self, value: V) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

impl<V> Default for Setting<V> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Setting<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_tuple("Setting").field(&*guard).finish()
    }
}

/// Type a dependency field resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub id: TypeId,
    pub name: &'static str,
}

impl Target {
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: type_name::<I>(),
        }
    }
}

/// Shape of a described field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Exactly one component
    One(Target),
    /// Every matching component
    Many(Target),
    /// A decoded configuration value
    Value { type_name: &'static str },
    /// A nested struct whose own fields are scanned too
    Embedded {
        type_name: &'static str,
        fields: Vec<FieldSpec>,
    },
}

#[derive(Clone)]
enum Binder {
    Wire(WireBinder),
    Value(ValueBinder),
    Prefix,
    Unbound,
}

/// Type-erased description of one field
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    tag: &'static str,
    tag_str: String,
    kind: FieldKind,
    binder: Binder,
}

impl FieldSpec {
    fn new(name: &str, tag: &'static str, tag_str: &str, kind: FieldKind, binder: Binder) -> Self {
        Self {
            name: name.to_string(),
            tag,
            tag_str: tag_str.to_string(),
            kind,
            binder,
        }
    }

    /// Synthetic field binding a whole [`ConfigurationProperties`] component
    pub fn prefix(prefix: &str) -> Self {
        Self::new(
            PREFIX_TAG,
            PREFIX_TAG,
            prefix,
            FieldKind::Value {
                type_name: "configuration properties",
            },
            Binder::Prefix,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name: `wire`, `func`, `value`, `prop` or `prefix`; empty for embedded structs
    pub fn tag(&self) -> &str {
        self.tag
    }

    /// Raw tag string
    pub fn tag_str(&self) -> &str {
        &self.tag_str
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn target(&self) -> Option<Target> {
        match self.kind {
            FieldKind::One(target) | FieldKind::Many(target) => Some(target),
            FieldKind::Value { .. } | FieldKind::Embedded { .. } => None,
        }
    }

    pub fn is_singular(&self) -> bool {
        matches!(self.kind, FieldKind::One(_))
    }

    /// Assign resolved dependencies into the field of `owner`
    pub fn bind_components(&self, owner: &Instance, dependencies: &[Instance]) -> Result<()> {
        match &self.binder {
            Binder::Wire(bind) => bind(owner.as_any(), dependencies),
            _ => Err(Error::binding(&self.name, "field does not hold components")),
        }
    }

    /// Decode `literal` into the field of `owner`
    pub fn bind_value(&self, owner: &Instance, literal: &str, validate: bool) -> Result<()> {
        match &self.binder {
            Binder::Value(bind) => bind(owner.as_any(), literal, validate),
            Binder::Prefix => owner
                .cast::<dyn ConfigurationProperties>()
                .ok_or_else(|| {
                    Error::binding(
                        &self.name,
                        format!("{} does not bind configuration properties", owner.type_name()),
                    )
                })?
                .bind(literal, validate),
            _ => Err(Error::binding(&self.name, "field does not hold a configuration value")),
        }
    }

    fn rebase<S: 'static, E: 'static>(self, slot: fn(&S) -> &E) -> Self {
        let binder = match self.binder {
            Binder::Wire(inner) => {
                let field = self.name.clone();
                Binder::Wire(Arc::new(move |owner: &dyn Any, deps: &[Instance]| {
                    let owner = downcast_owner::<S>(owner, &field)?;
                    inner(slot(owner) as &dyn Any, deps)
                }))
            }
            Binder::Value(inner) => {
                let field = self.name.clone();
                Binder::Value(Arc::new(move |owner: &dyn Any, literal: &str, validate: bool| {
                    let owner = downcast_owner::<S>(owner, &field)?;
                    inner(slot(owner) as &dyn Any, literal, validate)
                }))
            }
            other => other,
        };
        let kind = match self.kind {
            FieldKind::Embedded { type_name, fields } => FieldKind::Embedded {
                type_name,
                fields: fields.into_iter().map(|f| f.rebase(slot)).collect(),
            },
            other => other,
        };
        Self {
            binder,
            kind,
            ..self
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("tag_str", &self.tag_str)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Collects the field descriptions of a component type
///
/// ```ignore
/// impl Component for Service {
///     fn describe(f: &mut Fields<Self>) {
///         f.wire("repo", "", |s| &s.repo)
///             .prop("timeout", "http.timeout:30s", |s| &s.timeout);
///     }
/// }
/// ```
pub struct Fields<S> {
    specs: Vec<FieldSpec>,
    _owner: PhantomData<fn() -> S>,
}

impl<S> Fields<S> {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            _owner: PhantomData,
        }
    }

    pub fn into_specs(self) -> Vec<FieldSpec> {
        self.specs
    }

    fn push(&mut self, spec: FieldSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }
}

impl<S> Default for Fields<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Component> Fields<S> {
    /// One component, by name when the tag has a value, otherwise by type or interface
    pub fn wire<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Wire<I>,
    ) -> &mut Self {
        self.push_one(name, WIRE_TAG, tag, slot)
    }

    /// Every component assignable to `I`
    pub fn wire_all<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &WireAll<I>,
    ) -> &mut Self {
        self.push_many(name, WIRE_TAG, tag, slot)
    }

    /// One component selected by a named function, e.g. `"kind,returns=redis"`
    pub fn func<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Wire<I>,
    ) -> &mut Self {
        self.push_one(name, FUNC_TAG, tag, slot)
    }

    pub fn func_all<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &WireAll<I>,
    ) -> &mut Self {
        self.push_many(name, FUNC_TAG, tag, slot)
    }

    /// A literal value; may contain `${...}` placeholders and `#{...}` expressions
    pub fn value<V: DeserializeOwned + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Setting<V>,
    ) -> &mut Self {
        self.push_value(name, VALUE_TAG, tag, slot, None)
    }

    pub fn value_validated<V: DeserializeOwned + Validate + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Setting<V>,
    ) -> &mut Self {
        self.push_value(name, VALUE_TAG, tag, slot, Some(validate_struct::<V>))
    }

    /// The configuration value at a dotted path, `path:default` supplies a fallback
    pub fn prop<V: DeserializeOwned + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Setting<V>,
    ) -> &mut Self {
        self.push_value(name, PROP_TAG, tag, slot, None)
    }

    pub fn prop_validated<V: DeserializeOwned + Validate + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        slot: fn(&S) -> &Setting<V>,
    ) -> &mut Self {
        self.push_value(name, PROP_TAG, tag, slot, Some(validate_struct::<V>))
    }

    /// A nested struct whose described fields belong to this component
    pub fn embed<E: Component>(&mut self, name: &str, slot: fn(&S) -> &E) -> &mut Self {
        let mut inner = Fields::<E>::new();
        E::describe(&mut inner);
        let fields = inner
            .into_specs()
            .into_iter()
            .map(|spec| spec.rebase(slot))
            .collect();
        self.push(FieldSpec::new(
            name,
            "",
            "",
            FieldKind::Embedded {
                type_name: type_name::<E>(),
                fields,
            },
            Binder::Unbound,
        ))
    }

    fn push_one<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag_name: &'static str,
        tag: &str,
        slot: fn(&S) -> &Wire<I>,
    ) -> &mut Self {
        let field = name.to_string();
        let binder: WireBinder = Arc::new(move |owner: &dyn Any, deps: &[Instance]| {
            let owner = downcast_owner::<S>(owner, &field)?;
            match deps {
                [] => Ok(()),
                [dep] => {
                    slot(owner).set(cast_dependency::<I>(dep, &field)?);
                    Ok(())
                }
                _ => Err(Error::binding(
                    &field,
                    format!("expected a single component, got {}", deps.len()),
                )),
            }
        });
        self.push(FieldSpec::new(
            name,
            tag_name,
            tag,
            FieldKind::One(Target::of::<I>()),
            Binder::Wire(binder),
        ))
    }

    fn push_many<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag_name: &'static str,
        tag: &str,
        slot: fn(&S) -> &WireAll<I>,
    ) -> &mut Self {
        let field = name.to_string();
        let binder: WireBinder = Arc::new(move |owner: &dyn Any, deps: &[Instance]| {
            let owner = downcast_owner::<S>(owner, &field)?;
            let values = deps
                .iter()
                .map(|dep| cast_dependency::<I>(dep, &field))
                .collect::<Result<Vec<_>>>()?;
            slot(owner).set(values);
            Ok(())
        });
        self.push(FieldSpec::new(
            name,
            tag_name,
            tag,
            FieldKind::Many(Target::of::<I>()),
            Binder::Wire(binder),
        ))
    }

    fn push_value<V: DeserializeOwned + Send + Sync + 'static>(
        &mut self,
        name: &str,
        tag_name: &'static str,
        tag: &str,
        slot: fn(&S) -> &Setting<V>,
        validator: Option<StructValidator<V>>,
    ) -> &mut Self {
        let field = name.to_string();
        let binder: ValueBinder = Arc::new(move |owner: &dyn Any, literal: &str, validate: bool| {
            let owner = downcast_owner::<S>(owner, &field)?;
            let value: V = decode(&field, literal)?;
            if validate {
                let check = validator.ok_or_else(|| {
                    Error::validation(
                        &field,
                        format!("{} has no structural validator", type_name::<V>()),
                    )
                })?;
                check(&value).map_err(|message| Error::validation(&field, message))?;
            }
            slot(owner).set(value);
            Ok(())
        });
        self.push(FieldSpec::new(
            name,
            tag_name,
            tag,
            FieldKind::Value {
                type_name: type_name::<V>(),
            },
            Binder::Value(binder),
        ))
    }
}

fn validate_struct<V: Validate>(value: &V) -> std::result::Result<(), String> {
    value.validate().map_err(|errors| errors.to_string())
}

fn downcast_owner<'a, S: 'static>(owner: &'a dyn Any, field: &str) -> Result<&'a S> {
    owner
        .downcast_ref::<S>()
        .ok_or_else(|| Error::binding(field, format!("owner is not a {}", type_name::<S>())))
}

fn cast_dependency<I: ?Sized + Send + Sync + 'static>(dep: &Instance, field: &str) -> Result<Arc<I>> {
    dep.cast::<I>().ok_or_else(|| {
        Error::binding(
            field,
            format!("{} cannot be bound as {}", dep.type_name(), type_name::<I>()),
        )
    })
}
