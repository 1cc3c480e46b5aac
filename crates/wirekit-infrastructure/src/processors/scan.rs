//! Tag scanning
//!
//! Each scan processor walks a component (embedded structs included) and
//! records a [`Property`] for every field carrying its tag.

use std::sync::Arc;

use tracing::debug;
use wirekit_application::{DefinitionRegistry, DefinitionRegistryPostProcessor, ScannedField, Scanner};
use wirekit_domain::constants::{FUNC_TAG, PROP_TAG, VALUE_TAG, WIRE_TAG};
use wirekit_domain::{
    ConfigurationProperties, Error, FieldKind, FieldSpec, Holder, Instance, Meta, Ordered,
    PriorityOrdered, Property, PropertyType, Result, component,
};

use super::builtin_processor;
use crate::constants::ORDER_TAG_SCAN;

/// Depth-first walk over described fields
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldScanner;

impl Scanner for FieldScanner {
    fn scan(&self, meta: &Meta) -> Vec<ScannedField> {
        let mut found = Vec::new();
        walk(&Arc::new(Holder::root(meta)), meta.raw().fields(), &mut found);
        found
    }
}

fn walk(holder: &Arc<Holder>, fields: &[FieldSpec], found: &mut Vec<ScannedField>) {
    for field in fields {
        if let FieldKind::Embedded { type_name, fields } = field.kind() {
            let child = Arc::new(Holder::embedded(field.name(), type_name, Arc::clone(holder)));
            walk(&child, fields, found);
        } else {
            found.push(ScannedField {
                holder: Arc::clone(holder),
                field: field.clone(),
                position: found.len(),
            });
        }
    }
}

/// Record a property for every field tagged `tag`, after `rewrite`
fn scan_tag(
    meta: &Meta,
    tag: &str,
    property_type: PropertyType,
    rewrite: impl Fn(&mut Property) -> Result<()>,
) -> Result<()> {
    let mut properties = Vec::new();
    for scanned in FieldScanner.scan(meta) {
        if scanned.field.tag() != tag {
            continue;
        }
        let mut property = Property::new(scanned.holder, scanned.field, property_type, scanned.position);
        rewrite(&mut property)?;
        properties.push(property);
    }
    if !properties.is_empty() {
        debug!(component = meta.name(), tag, count = properties.len(), "Scanned tagged fields");
        meta.with_properties(|existing| existing.extend(properties));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct WireTagScanProcessor;

impl WireTagScanProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn DefinitionRegistryPostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(WireTagScanProcessor, ORDER_TAG_SCAN);

impl DefinitionRegistryPostProcessor for WireTagScanProcessor {
    fn post_process_definition_registry(&self, _registry: &dyn DefinitionRegistry, meta: &Meta) -> Result<()> {
        scan_tag(meta, WIRE_TAG, PropertyType::Component, |_| Ok(()))
    }
}

#[derive(Debug, Default)]
pub struct FuncTagScanProcessor;

impl FuncTagScanProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn DefinitionRegistryPostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(FuncTagScanProcessor, ORDER_TAG_SCAN);

impl DefinitionRegistryPostProcessor for FuncTagScanProcessor {
    fn post_process_definition_registry(&self, _registry: &dyn DefinitionRegistry, meta: &Meta) -> Result<()> {
        scan_tag(meta, FUNC_TAG, PropertyType::Component, |_| Ok(()))
    }
}

#[derive(Debug, Default)]
pub struct ValueTagScanProcessor;

impl ValueTagScanProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn DefinitionRegistryPostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(ValueTagScanProcessor, ORDER_TAG_SCAN);

impl DefinitionRegistryPostProcessor for ValueTagScanProcessor {
    fn post_process_definition_registry(&self, _registry: &dyn DefinitionRegistry, meta: &Meta) -> Result<()> {
        scan_tag(meta, VALUE_TAG, PropertyType::Configuration, |_| Ok(()))
    }
}

/// `prop:"a.b:default"` becomes the placeholder `${a.b:default}`
#[derive(Debug, Default)]
pub struct PropTagScanProcessor;

impl PropTagScanProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn DefinitionRegistryPostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(PropTagScanProcessor, ORDER_TAG_SCAN);

impl DefinitionRegistryPostProcessor for PropTagScanProcessor {
    fn post_process_definition_registry(&self, _registry: &dyn DefinitionRegistry, meta: &Meta) -> Result<()> {
        scan_tag(meta, PROP_TAG, PropertyType::Configuration, |property| {
            if property.tag_value.is_empty() {
                return Err(Error::binding(property.id(), "prop tag needs a configuration path"));
            }
            property.tag_value = format!("${{{}}}", property.tag_value);
            Ok(())
        })
    }
}

/// Components declaring [`ConfigurationProperties`] get one property for their whole prefix
#[derive(Debug, Default)]
pub struct PrefixScanProcessor;

impl PrefixScanProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn DefinitionRegistryPostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(PrefixScanProcessor, ORDER_TAG_SCAN);

impl DefinitionRegistryPostProcessor for PrefixScanProcessor {
    fn post_process_definition_registry(&self, _registry: &dyn DefinitionRegistry, meta: &Meta) -> Result<()> {
        let Some(properties) = meta.raw().cast::<dyn ConfigurationProperties>() else {
            return Ok(());
        };
        let prefix = properties.prefix().to_string();
        if prefix.is_empty() {
            return Err(Error::binding(meta.name(), "configuration prefix must not be empty"));
        }
        let mut property = Property::new(
            Arc::new(Holder::root(meta)),
            FieldSpec::prefix(&prefix),
            PropertyType::Configuration,
            usize::MAX,
        );
        property.tag_value = format!("${{{prefix}}}");
        debug!(component = meta.name(), prefix = %prefix, "Scanned configuration prefix");
        meta.add_property(property);
        Ok(())
    }
}
