//! Composable predicates over component metadata

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::constants::RESULT_WILDCARD;
use crate::meta::Meta;

#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Meta) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&Meta) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn test(&self, meta: &Meta) -> bool {
        (self.0)(meta)
    }

    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Self::new(move |m| self.test(m) && other.test(m))
    }

    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Self::new(move |m| self.test(m) || other.test(m))
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::new(move |m| !self.test(m))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// Matches every component
pub fn any() -> Predicate {
    Predicate::new(|_| true)
}

/// Components whose concrete type is `T`
pub fn of_type<T: ?Sized + 'static>() -> Predicate {
    type_id(TypeId::of::<T>())
}

pub fn type_id(id: TypeId) -> Predicate {
    Predicate::new(move |m| m.type_id() == id)
}

/// Components declared with interface `I`
pub fn implements<I: ?Sized + 'static>() -> Predicate {
    interface_id(TypeId::of::<I>())
}

pub fn interface_id(id: TypeId) -> Predicate {
    Predicate::new(move |m| m.instance().exposes(id))
}

/// Components of type `id` or declared with interface `id`
pub fn assignable_to(id: TypeId) -> Predicate {
    type_id(id).or(interface_id(id))
}

pub fn name(name: &str) -> Predicate {
    let name = name.to_string();
    Predicate::new(move |m| m.name() == name)
}

/// Components exposing a function called `function`
pub fn func_name(function: &str) -> Predicate {
    let function = function.to_string();
    Predicate::new(move |m| m.instance().has_function(&function))
}

/// Components whose `function` returns one of `expected`; `*` matches anything
pub fn func_name_and_result(function: &str, expected: Vec<String>) -> Predicate {
    if expected.is_empty() || expected.iter().any(|e| e == RESULT_WILDCARD) {
        return func_name(function);
    }
    let function = function.to_string();
    Predicate::new(move |m| {
        m.instance()
            .call_function(&function)
            .is_some_and(|result| expected.contains(&result))
    })
}

pub fn qualifier(qualifier: &str) -> Predicate {
    let qualifier = qualifier.to_string();
    Predicate::new(move |m| m.qualifier().as_deref() == Some(qualifier.as_str()))
}

/// All of `predicates`; true when empty
pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<_> = predicates.into_iter().collect();
    Predicate::new(move |m| predicates.iter().all(|p| p.test(m)))
}

/// Any of `predicates`; false when empty
pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<_> = predicates.into_iter().collect();
    Predicate::new(move |m| predicates.iter().any(|p| p.test(m)))
}

pub fn not(predicate: Predicate) -> Predicate {
    predicate.negate()
}
