//! Component trait and the optional capabilities a component may declare
//!
//! Capabilities are ordinary traits. A component opts in by implementing the
//! trait and declaring it on its [`Instance`](crate::instance::Instance) with
//! `implements::<dyn Trait>(|c| c)`. The container only ever discovers them
//! through that declaration.

use crate::error::Result;
use crate::fields::Fields;

/// A value the container can register, wire and manage
pub trait Component: Send + Sync + 'static {
    /// Describe the injectable fields of this type
    fn describe(_fields: &mut Fields<Self>)
    where
        Self: Sized,
    {
    }
}

/// Invoked after every field has been bound
pub trait InitializeComponent: Send + Sync {
    fn init(&self) -> Result<()>;
}

/// Invoked after every field has been bound, before [`InitializeComponent::init`]
pub trait InitializingComponent: Send + Sync {
    fn after_properties_set(&self) -> Result<()>;
}

/// Explicit component name. Named components count as aliases.
pub trait NamingComponent: Send + Sync {
    fn naming(&self) -> String;
}

/// Qualifier matched by `qualifier=` tag arguments
pub trait QualifierComponent: Send + Sync {
    fn qualifier(&self) -> String;
}

/// Preferred candidate when several satisfy a singular dependency
pub trait PrimaryComponent: Send + Sync {}

/// Sort order among post processors and runners, lower first
pub trait Ordered: Send + Sync {
    fn order(&self) -> i32;
}

/// Places the component in the earliest ordering tier
pub trait PriorityOrdered: Send + Sync {}

/// Invoked when the container closes
pub trait CloserComponent: Send + Sync {
    fn close(&self) -> Result<()>;
}

/// Skipped by eager refresh, created on first lookup
pub trait LazyInit: Send + Sync {}

/// Binds the whole component from the configuration subtree at `prefix`
pub trait ConfigurationProperties: Send + Sync {
    fn prefix(&self) -> &str;

    /// Decode `literal` into the component; `validate` requests structural validation
    fn bind(&self, literal: &str, validate: bool) -> Result<()>;
}

/// Declares the lifetime of a component
///
/// A prototype also needs a constructor, given with
/// [`InstanceBuilder::prototype`](crate::instance::InstanceBuilder::prototype).
pub trait ScopeComponent: Send + Sync {
    fn scope(&self) -> Scope;
}

/// Component lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One shared instance per container
    #[default]
    Singleton,
    /// A fresh instance per lookup
    Prototype,
}
