//! Tag Scan Tests

use std::sync::Arc;

use wirekit_application::{DefinitionRegistryPostProcessor, Scanner};
use wirekit_domain::{
    Component, Error, Fields, Holder, Instance, Meta, MetaId, Properties, PropertyType, Setting,
    Wire, WireAll,
};
use wirekit_infrastructure::processors::{
    FieldScanner, FuncTagScanProcessor, PrefixScanProcessor, PropTagScanProcessor,
    ValueTagScanProcessor, WireTagScanProcessor,
};
use wirekit_infrastructure::registry::DefaultDefinitionRegistry;

trait Store: Send + Sync {}

#[derive(Default)]
struct Limits {
    burst: Setting<u32>,
    store: Wire<dyn Store>,
}

impl Component for Limits {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("burst", "#{2 * 8}", |s| &s.burst)
            .wire("store", "", |s| &s.store);
    }
}

#[derive(Default)]
struct Gateway {
    primary: Wire<dyn Store>,
    replicas: WireAll<dyn Store>,
    limits: Limits,
    host: Setting<String>,
    backend: Wire<dyn Store>,
}

impl Component for Gateway {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .wire("primary", "main-store", |s| &s.primary)
            .wire_all("replicas", ",required=false", |s| &s.replicas)
            .embed("limits", |s| &s.limits)
            .prop("host", "gateway.host:localhost", |s| &s.host)
            .func("backend", "kind,returns=redis", |s| &s.backend);
    }
}

#[derive(Default)]
struct Broken {
    host: Setting<String>,
}

impl Component for Broken {
    fn describe(fields: &mut Fields<Self>) {
        fields.prop("host", "", |s| &s.host);
    }
}

fn meta(instance: Instance) -> Meta {
    let name = instance.type_name().to_string();
    Meta::new(MetaId::new(0), name, false, instance)
}

fn run(processor: &dyn DefinitionRegistryPostProcessor, meta: &Meta) -> Result<(), Error> {
    processor.post_process_definition_registry(&DefaultDefinitionRegistry::new(), meta)
}

#[test]
fn test_scanner_walks_embedded_fields_in_order() {
    let meta = meta(Instance::new(Gateway::default()));
    let scanned = FieldScanner.scan(&meta);

    let names: Vec<_> = scanned.iter().map(|s| s.field.name()).collect();
    assert_eq!(names, vec!["primary", "replicas", "burst", "store", "host", "backend"]);
    let positions: Vec<_> = scanned.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);

    let burst = &scanned[2];
    assert_eq!(burst.holder.depth(), 1);
    match burst.holder.as_ref() {
        Holder::Embedded { field, .. } => assert_eq!(field, "limits"),
        Holder::Root { .. } => panic!("Expected an embedded holder"),
    }
    assert_eq!(scanned[0].holder.depth(), 0);
}

#[test]
fn test_wire_scan_collects_component_properties() {
    let meta = meta(Instance::new(Gateway::default()));
    run(&WireTagScanProcessor, &meta).unwrap();

    let properties = meta.properties();
    let names: Vec<_> = properties.iter().map(|p| p.field.name()).collect();
    assert_eq!(names, vec!["primary", "replicas", "store"]);
    assert!(properties.iter().all(|p| p.property_type == PropertyType::Component));
    assert_eq!(properties[0].tag_value, "main-store");
    assert!(!properties[1].required());
    assert_eq!(properties[2].position, 3);
}

#[test]
fn test_func_scan_parses_arguments() {
    let meta = meta(Instance::new(Gateway::default()));
    run(&FuncTagScanProcessor, &meta).unwrap();

    let properties = meta.properties();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].tag_value, "kind");
    assert_eq!(properties[0].args.values_flat("returns"), vec!["redis".to_string()]);
}

#[test]
fn test_value_and_prop_scans() {
    let meta = meta(Instance::new(Gateway::default()));
    run(&ValueTagScanProcessor, &meta).unwrap();
    run(&PropTagScanProcessor, &meta).unwrap();

    let properties = meta.properties();
    assert_eq!(properties.len(), 2);
    assert!(properties.iter().all(|p| p.is_configuration()));
    assert_eq!(properties[0].tag_value, "#{2 * 8}");
    assert_eq!(properties[1].tag_value, "${gateway.host:localhost}");
}

#[test]
fn test_prop_scan_requires_path() {
    let meta = meta(Instance::new(Broken::default()));
    let err = run(&PropTagScanProcessor, &meta).unwrap_err();
    assert!(matches!(err, Error::Binding { .. }));
}

#[test]
fn test_prefix_scan() {
    let meta = meta(Properties::<serde_json::Value>::new("database").into_instance());
    run(&PrefixScanProcessor, &meta).unwrap();

    let properties = meta.properties();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].tag, "prefix");
    assert_eq!(properties[0].tag_value, "${database}");
}

#[test]
fn test_prefix_scan_ignores_plain_components() {
    let meta = meta(Instance::new(Gateway::default()));
    run(&PrefixScanProcessor, &meta).unwrap();
    assert!(meta.properties().is_empty());
}

#[test]
fn test_prefix_scan_rejects_empty_prefix() {
    let meta = meta(Properties::<serde_json::Value>::new("").into_instance());
    assert!(run(&PrefixScanProcessor, &meta).is_err());
}

#[test]
fn test_scanned_holder_is_shared() {
    let meta = meta(Instance::new(Gateway::default()));
    let scanned = FieldScanner.scan(&meta);
    assert!(Arc::ptr_eq(&scanned[0].holder, &scanned[1].holder));
    assert!(Arc::ptr_eq(&scanned[2].holder, &scanned[3].holder));
}
