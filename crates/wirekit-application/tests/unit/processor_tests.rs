//! Post Processor Default Hook Tests

use wirekit_application::{
    ComponentPostProcessor, InstantiationAwarePostProcessor, SmartInstantiationAwarePostProcessor,
};
use wirekit_domain::{Component, Instance, Meta, MetaId};

#[derive(Default)]
struct Passthrough;

impl Component for Passthrough {}
impl ComponentPostProcessor for Passthrough {}
impl InstantiationAwarePostProcessor for Passthrough {}
impl SmartInstantiationAwarePostProcessor for Passthrough {}

struct Target;

impl Component for Target {}

fn target() -> (Instance, Meta) {
    let instance = Instance::new(Target);
    let meta = Meta::new(MetaId::new(0), "target".to_string(), false, instance.clone());
    (instance, meta)
}

#[test]
fn test_component_hooks_keep_the_instance() {
    let (instance, _) = target();
    let before = Passthrough.before_initialization(&instance, "target").unwrap();
    let after = Passthrough.after_initialization(&instance, "target").unwrap();
    assert!(before.unwrap().ptr_eq(&instance));
    assert!(after.unwrap().ptr_eq(&instance));
}

#[test]
fn test_instantiation_hooks_do_not_interfere() {
    let (instance, meta) = target();
    assert!(Passthrough.before_instantiation(&meta, "target").unwrap().is_none());
    assert!(Passthrough.after_instantiation(&meta, "target").unwrap());
    let mut properties = meta.properties();
    Passthrough
        .post_process_properties(&mut properties, &instance, "target")
        .unwrap();
    assert!(properties.is_empty());
}

#[test]
fn test_early_reference_defaults_to_the_instance() {
    let (instance, _) = target();
    let early = Passthrough
        .early_component_reference(&instance, "target")
        .unwrap();
    assert!(early.ptr_eq(&instance));
}
