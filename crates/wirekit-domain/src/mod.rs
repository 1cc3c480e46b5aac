//! Domain layer - wirekit
//!
//! Component metadata and the vocabulary every other layer speaks:
//!
//! - [`instance`]: type-erased component handles with declared capabilities
//! - [`fields`]: injectable slots and their descriptions
//! - [`component`]: the component trait and optional capabilities
//! - [`meta`], [`property`], [`holder`], [`tag`]: the metadata model
//! - [`query`]: predicates over registered components
//! - [`decode`], [`properties`]: configuration decoding and typed subtrees
//!
//! This crate has no knowledge of registries, processors or configuration
//! sources; those live in the application and infrastructure layers.

pub mod component;
pub mod constants;
pub mod decode;
pub mod error;
pub mod fields;
pub mod holder;
pub mod instance;
mod macros;
pub mod meta;
pub mod properties;
pub mod property;
pub mod query;
pub mod tag;

pub use component::{
    CloserComponent, Component, ConfigurationProperties, InitializeComponent,
    InitializingComponent, LazyInit, NamingComponent, Ordered, PrimaryComponent, PriorityOrdered,
    QualifierComponent, Scope, ScopeComponent,
};
pub use error::{Error, Result};
pub use fields::{FieldKind, FieldSpec, Fields, Setting, Target, Wire, WireAll};
pub use holder::Holder;
pub use instance::{Instance, InstanceBuilder};
pub use meta::{Meta, MetaId};
pub use properties::Properties;
pub use property::{Property, PropertyType};
pub use query::Predicate;
pub use tag::TagArg;
