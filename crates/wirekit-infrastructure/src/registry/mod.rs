//! Component registries
//!
//! | Registry | Holds |
//! |----------|-------|
//! | [`SingletonRegistry`] | raw instances registered before preparation |
//! | [`DefaultDefinitionRegistry`] | component metadata, in registration order |
//! | [`SingletonComponentRegistry`] | created singletons across three tiers |

pub mod component;
pub mod definition;
pub mod singleton;

pub use component::{SingletonComponentRegistry, SingletonFactory};
pub use definition::DefaultDefinitionRegistry;
pub use singleton::SingletonRegistry;
