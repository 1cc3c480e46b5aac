//! A scanned, injectable field of a component

use std::sync::Arc;

use crate::error::Result;
use crate::fields::{FieldSpec, Target};
use crate::holder::Holder;
use crate::instance::Instance;
use crate::meta::Meta;
use crate::tag::{self, TagArg};

/// Whether a property is resolved from other components or from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Component,
    Configuration,
}

#[derive(Clone)]
pub struct Property {
    pub holder: Arc<Holder>,
    pub field: FieldSpec,
    pub property_type: PropertyType,
    /// Tag name
    pub tag: String,
    /// Raw tag string as declared
    pub tag_str: String,
    /// Tag value, rewritten in place by placeholder and expression processing
    pub tag_value: String,
    pub args: TagArg,
    /// Candidate components; consumed when the property is bound
    pub injects: Vec<Arc<Meta>>,
    /// Declaration order within the component
    pub position: usize,
}

impl Property {
    pub fn new(holder: Arc<Holder>, field: FieldSpec, property_type: PropertyType, position: usize) -> Self {
        let tag_str = field.tag_str().to_string();
        let (tag_value, args) = tag::parse(&tag_str);
        Self {
            holder,
            tag: field.tag().to_string(),
            field,
            property_type,
            tag_str,
            tag_value,
            args,
            injects: Vec::new(),
            position,
        }
    }

    /// Human readable identifier used in diagnostics
    pub fn id(&self) -> String {
        format!(
            "{}.{} ({}:\"{}\")",
            self.holder.path(),
            self.field.name(),
            self.tag,
            self.tag_str
        )
    }

    pub fn is_component(&self) -> bool {
        self.property_type == PropertyType::Component
    }

    pub fn is_configuration(&self) -> bool {
        self.property_type == PropertyType::Configuration
    }

    pub fn is_singular(&self) -> bool {
        self.field.is_singular()
    }

    pub fn target(&self) -> Option<Target> {
        self.field.target()
    }

    pub fn required(&self) -> bool {
        self.args.required()
    }

    pub fn bind_components(&self, owner: &Instance, dependencies: &[Instance]) -> Result<()> {
        self.field.bind_components(owner, dependencies)
    }

    pub fn bind_value(&self, owner: &Instance, literal: &str, validate: bool) -> Result<()> {
        self.field.bind_value(owner, literal, validate)
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id())
            .field("type", &self.property_type)
            .field("tag_value", &self.tag_value)
            .field("args", &self.args)
            .field(
                "injects",
                &self.injects.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
