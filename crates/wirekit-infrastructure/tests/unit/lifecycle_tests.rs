//! Component Lifecycle Tests
//!
//! Circular references, early exposure, scopes, initialization callbacks,
//! post processor hooks and closing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use wirekit_application::{
    ComponentPostProcessor, DefinitionRegistry, DefinitionRegistryPostProcessor, Factory,
    FactoryExt, InstantiationAwarePostProcessor, SmartInstantiationAwarePostProcessor,
};
use wirekit_domain::{
    CloserComponent, Component, Error, Fields, InitializeComponent, InitializingComponent,
    Instance, LazyInit, Meta, NamingComponent, Ordered, Property, Result, Setting, Wire, component,
};
use wirekit_infrastructure::{ConfigTree, DefaultFactory};

type Events = Arc<Mutex<Vec<String>>>;

fn factory() -> DefaultFactory {
    DefaultFactory::with_builtin_processors(Arc::new(ConfigTree::from_value(json!({}))))
}

fn events() -> Events {
    Arc::new(Mutex::new(Vec::new()))
}

fn push(events: &Events, event: &str) {
    events.lock().unwrap().push(event.to_string());
}

fn recorded(events: &Events) -> Vec<String> {
    events.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Circular references
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Alpha {
    beta: Wire<Beta>,
}

impl Component for Alpha {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("beta", "", |s| &s.beta);
    }
}

#[derive(Default)]
struct Beta {
    alpha: Wire<Alpha>,
}

impl Component for Beta {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("alpha", "", |s| &s.alpha);
    }
}

fn register_cycle(factory: &DefaultFactory) {
    factory.register(Instance::new(Alpha::default()));
    factory.register(Instance::new(Beta::default()));
}

#[test]
fn test_circular_reference_allowed_by_default() {
    let factory = factory();
    register_cycle(&factory);
    factory.refresh().unwrap();

    let alpha = factory.get_component::<Alpha>().unwrap();
    let beta = factory.get_component::<Beta>().unwrap();
    assert!(Arc::ptr_eq(&alpha.beta.get().unwrap(), &beta));
    assert!(Arc::ptr_eq(&beta.alpha.get().unwrap(), &alpha));
}

#[test]
fn test_circular_reference_rejected_when_disabled() {
    let factory = factory().allow_circular_references(false);
    register_cycle(&factory);
    let err = factory.refresh().unwrap_err();
    match err.root_cause() {
        Error::CircularReference { component, chain } => {
            assert!(component.ends_with("Alpha"));
            assert!(chain.contains("Beta"));
        }
        other => panic!("Expected CircularReference error, got {other}"),
    }
}

/// Replaces the component whose name ends with `target` after initialization
struct Wrapping {
    target: &'static str,
}

impl Component for Wrapping {}

impl ComponentPostProcessor for Wrapping {
    fn after_initialization(&self, component: &Instance, name: &str) -> Result<Option<Instance>> {
        if name.ends_with(self.target) {
            return Ok(Some(Instance::new(Alpha::default())));
        }
        Ok(Some(component.clone()))
    }
}

#[test]
fn test_wrapped_component_in_cycle_is_inconsistent() {
    let factory = factory();
    factory.register(component!(Wrapping { target: "::Alpha" }; dyn ComponentPostProcessor));
    register_cycle(&factory);
    let err = factory.refresh().unwrap_err();
    match err.root_cause() {
        Error::InconsistentEarlyExposure {
            component,
            dependents,
        } => {
            assert!(component.ends_with("Alpha"));
            assert_eq!(dependents.len(), 1);
            assert!(dependents[0].ends_with("Beta"));
        }
        other => panic!("Expected InconsistentEarlyExposure error, got {other}"),
    }
}

#[test]
fn test_wrapped_component_without_cycle() {
    let factory = factory();
    factory.register(component!(Wrapping { target: "::Gamma" }; dyn ComponentPostProcessor));
    factory.register(Instance::new(Gamma));
    factory.refresh().unwrap();

    let exposed = factory.get_component_by_name(std::any::type_name::<Gamma>()).unwrap();
    assert!(exposed.downcast::<Alpha>().is_some());
}

#[derive(Default)]
struct Gamma;

impl Component for Gamma {}

/// Hands out one cached wrapper both early and after initialization
struct CachedWrapping {
    target: &'static str,
    cache: Mutex<Option<Instance>>,
}

impl CachedWrapping {
    fn wrapper(&self) -> Instance {
        self.cache
            .lock()
            .unwrap()
            .get_or_insert_with(|| Instance::new(Alpha::default()))
            .clone()
    }
}

impl Component for CachedWrapping {}

impl SmartInstantiationAwarePostProcessor for CachedWrapping {
    fn early_component_reference(&self, component: &Instance, name: &str) -> Result<Instance> {
        if name.ends_with(self.target) {
            return Ok(self.wrapper());
        }
        Ok(component.clone())
    }
}

impl ComponentPostProcessor for CachedWrapping {
    fn after_initialization(&self, component: &Instance, name: &str) -> Result<Option<Instance>> {
        if name.ends_with(self.target) {
            return Ok(Some(self.wrapper()));
        }
        Ok(Some(component.clone()))
    }
}

#[test]
fn test_consistent_early_reference_in_cycle() {
    let factory = factory();
    factory.register(component!(
        CachedWrapping { target: "::Alpha", cache: Mutex::new(None) };
        dyn SmartInstantiationAwarePostProcessor,
        dyn ComponentPostProcessor
    ));
    register_cycle(&factory);
    factory.refresh().unwrap();

    let alpha = factory.get_component::<Alpha>().unwrap();
    let beta = factory.get_component::<Beta>().unwrap();
    assert!(Arc::ptr_eq(&beta.alpha.get().unwrap(), &alpha));
}

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Ticket;

impl Component for Ticket {}

fn ticket() -> Instance {
    Instance::builder(Ticket).prototype(Ticket::default).build()
}

#[derive(Default)]
struct Desk {
    ticket: Wire<Ticket>,
}

impl Component for Desk {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("ticket", "", |s| &s.ticket);
    }
}

#[test]
fn test_prototype_is_fresh_per_lookup() {
    let factory = factory();
    factory.register(ticket());
    factory.refresh().unwrap();

    let name = std::any::type_name::<Ticket>();
    assert!(!factory.singleton_names().iter().any(|n| n == name));
    let first = factory.get_component_by_name(name).unwrap();
    let second = factory.get_component_by_name(name).unwrap();
    assert!(!first.ptr_eq(&second));
}

#[test]
fn test_prototype_injected_into_singleton() {
    let factory = factory();
    let registered = ticket();
    factory.register(registered.clone());
    factory.register(Instance::new(Desk::default()));
    factory.refresh().unwrap();

    let desk = factory.get_component::<Desk>().unwrap();
    let injected = desk.ticket.get().unwrap();
    let original = registered.downcast::<Ticket>().unwrap();
    assert!(!Arc::ptr_eq(&injected, &original));
}

#[derive(Default)]
struct Ping {
    pong: Wire<Pong>,
}

impl Component for Ping {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("pong", "", |s| &s.pong);
    }
}

#[derive(Default)]
struct Pong {
    ping: Wire<Ping>,
}

impl Component for Pong {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("ping", "", |s| &s.ping);
    }
}

#[test]
fn test_prototype_cycle_detected() {
    let factory = factory();
    factory.register(Instance::builder(Ping::default()).prototype(Ping::default).build());
    factory.register(Instance::builder(Pong::default()).prototype(Pong::default).build());
    factory.refresh().unwrap();

    let err = factory
        .get_component_by_name(std::any::type_name::<Ping>())
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::CircularReference { .. }));
}

#[test]
fn test_prototype_cycle_detected_before_construction() {
    let pings = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pings);
    let factory = factory();
    factory.register(
        Instance::builder(Ping::default())
            .prototype(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ping::default()
            })
            .build(),
    );
    factory.register(Instance::builder(Pong::default()).prototype(Pong::default).build());
    factory.refresh().unwrap();
    assert_eq!(pings.load(Ordering::SeqCst), 0);

    let err = factory
        .get_component_by_name(std::any::type_name::<Ping>())
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::CircularReference { .. }));
    assert_eq!(pings.load(Ordering::SeqCst), 1);
}

struct Lazy {
    inits: Arc<AtomicUsize>,
}

impl Component for Lazy {}

impl LazyInit for Lazy {}

impl InitializeComponent for Lazy {
    fn init(&self) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_lazy_component_created_on_first_lookup() {
    let inits = Arc::new(AtomicUsize::new(0));
    let factory = factory();
    factory.register(component!(
        Lazy { inits: Arc::clone(&inits) };
        dyn LazyInit,
        dyn InitializeComponent
    ));
    factory.refresh().unwrap();
    assert_eq!(inits.load(Ordering::SeqCst), 0);

    let name = std::any::type_name::<Lazy>();
    factory.get_component_by_name(name).unwrap();
    factory.get_component_by_name(name).unwrap();
    assert_eq!(inits.load(Ordering::SeqCst), 1);
    assert!(factory.singleton_names().iter().any(|n| n == name));
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

struct Recorder {
    port: Setting<u16>,
    events: Events,
}

impl Component for Recorder {
    fn describe(fields: &mut Fields<Self>) {
        fields.value("port", "8080", |s| &s.port);
    }
}

impl InitializingComponent for Recorder {
    fn after_properties_set(&self) -> Result<()> {
        let event = if self.port.get() == Some(8080) {
            "after_properties_set"
        } else {
            "unbound"
        };
        push(&self.events, event);
        Ok(())
    }
}

impl InitializeComponent for Recorder {
    fn init(&self) -> Result<()> {
        push(&self.events, "init");
        Ok(())
    }
}

struct Tracing {
    events: Events,
}

impl Component for Tracing {}

impl ComponentPostProcessor for Tracing {
    fn before_initialization(&self, component: &Instance, name: &str) -> Result<Option<Instance>> {
        if name.ends_with("::Recorder") {
            push(&self.events, "before");
        }
        Ok(Some(component.clone()))
    }

    fn after_initialization(&self, component: &Instance, name: &str) -> Result<Option<Instance>> {
        if name.ends_with("::Recorder") {
            push(&self.events, "after");
        }
        Ok(Some(component.clone()))
    }
}

#[test]
fn test_initialization_order() {
    let events = events();
    let factory = factory();
    factory.register(component!(
        Tracing { events: Arc::clone(&events) };
        dyn ComponentPostProcessor
    ));
    factory.register(component!(
        Recorder { port: Setting::new(), events: Arc::clone(&events) };
        dyn InitializingComponent,
        dyn InitializeComponent
    ));
    factory.refresh().unwrap();

    assert_eq!(
        recorded(&events),
        vec!["before", "after_properties_set", "init", "after"]
    );
}

struct Guard {
    label: &'static str,
    events: Events,
}

impl Component for Guard {}

impl InitializeComponent for Guard {
    fn init(&self) -> Result<()> {
        push(&self.events, &format!("init:{}", self.label));
        Ok(())
    }
}

/// Swaps `Guard` before initialization, with or without the init capability
struct Substituting {
    declares_init: bool,
    events: Events,
}

impl Component for Substituting {}

impl ComponentPostProcessor for Substituting {
    fn before_initialization(&self, component: &Instance, name: &str) -> Result<Option<Instance>> {
        if !name.ends_with("::Guard") {
            return Ok(Some(component.clone()));
        }
        let replacement = Guard {
            label: "replacement",
            events: Arc::clone(&self.events),
        };
        Ok(Some(if self.declares_init {
            component!(replacement; dyn InitializeComponent)
        } else {
            Instance::new(replacement)
        }))
    }
}

fn run_substitution(declares_init: bool) -> Vec<String> {
    let events = events();
    let factory = factory();
    factory.register(component!(
        Substituting { declares_init, events: Arc::clone(&events) };
        dyn ComponentPostProcessor
    ));
    factory.register(component!(
        Guard { label: "original", events: Arc::clone(&events) };
        dyn InitializeComponent
    ));
    factory.refresh().unwrap();
    recorded(&events)
}

#[test]
fn test_init_runs_on_substituted_component() {
    assert_eq!(run_substitution(true), vec!["init:replacement"]);
}

#[test]
fn test_init_falls_back_to_raw_component() {
    assert_eq!(run_substitution(false), vec!["init:original"]);
}

struct Failing;

impl Component for Failing {}

impl InitializeComponent for Failing {
    fn init(&self) -> Result<()> {
        Err(Error::component("failing", "init refused"))
    }
}

#[test]
fn test_init_failure_aborts_refresh() {
    let factory = factory();
    factory.register(component!(Failing; dyn InitializeComponent));
    let err = factory.refresh().unwrap_err();
    assert!(matches!(err, Error::Creation { .. }));
    assert!(matches!(err.root_cause(), Error::Component { .. }));
    assert!(factory.singleton_names().iter().all(|n| !n.ends_with("Failing")));
}

// ---------------------------------------------------------------------------
// Post processor hooks
// ---------------------------------------------------------------------------

trait Missing: Send + Sync {}

#[derive(Default)]
struct Needy {
    missing: Wire<dyn Missing>,
}

impl Component for Needy {
    fn describe(fields: &mut Fields<Self>) {
        fields.wire("missing", "", |s| &s.missing);
    }
}

struct Replacer;

impl Component for Replacer {}

impl InstantiationAwarePostProcessor for Replacer {
    fn before_instantiation(&self, _meta: &Meta, name: &str) -> Result<Option<Instance>> {
        if name.ends_with("::Needy") {
            return Ok(Some(Instance::new(Needy::default())));
        }
        Ok(None)
    }
}

#[test]
fn test_replacement_before_instantiation_skips_population() {
    let factory = factory();
    let registered = Instance::new(Needy::default());
    factory.register(component!(Replacer; dyn InstantiationAwarePostProcessor));
    factory.register(registered.clone());
    factory.refresh().unwrap();

    let exposed = factory
        .get_component_by_name(std::any::type_name::<Needy>())
        .unwrap();
    assert!(!exposed.ptr_eq(&registered));
    assert!(!exposed.downcast::<Needy>().unwrap().missing.is_wired());
}

/// Vetoes its own property processing, which would otherwise fail
struct Vetoing;

impl Component for Vetoing {}

impl InstantiationAwarePostProcessor for Vetoing {
    fn after_instantiation(&self, _meta: &Meta, _name: &str) -> Result<bool> {
        Ok(false)
    }

    fn post_process_properties(
        &self,
        _properties: &mut [Property],
        _component: &Instance,
        name: &str,
    ) -> Result<()> {
        Err(Error::component(name, "should have been skipped"))
    }
}

#[test]
fn test_after_instantiation_veto_skips_processor() {
    let factory = factory();
    factory.register(component!(Vetoing; dyn InstantiationAwarePostProcessor));
    factory.register(Instance::new(Gamma));
    factory.refresh().unwrap();
}

struct Step {
    label: &'static str,
    order: Option<i32>,
    events: Events,
}

impl Component for Step {}

impl NamingComponent for Step {
    fn naming(&self) -> String {
        format!("step-{}", self.label)
    }
}

impl Ordered for Step {
    fn order(&self) -> i32 {
        self.order.unwrap_or_default()
    }
}

impl InstantiationAwarePostProcessor for Step {
    fn post_process_properties(
        &self,
        _properties: &mut [Property],
        _component: &Instance,
        name: &str,
    ) -> Result<()> {
        if name.ends_with("::Gamma") {
            push(&self.events, self.label);
        }
        Ok(())
    }
}

#[test]
fn test_processors_run_in_order() {
    let events = events();
    let factory = factory();
    let step = |label, order: Option<i32>| {
        let value = Step {
            label,
            order,
            events: Arc::clone(&events),
        };
        let builder = Instance::builder(value)
            .implements::<dyn InstantiationAwarePostProcessor>(|c| c)
            .implements::<dyn NamingComponent>(|c| c);
        match order {
            Some(_) => builder.implements::<dyn Ordered>(|c| c).build(),
            None => builder.build(),
        }
    };
    factory.register(step("a-plain", None));
    factory.register(step("late", Some(900)));
    factory.register(step("early", Some(800)));
    factory.register(Instance::new(Gamma));
    factory.refresh().unwrap();

    assert_eq!(recorded(&events), vec!["early", "late", "a-plain"]);
}

#[derive(Default)]
struct BrokenA {
    host: Setting<String>,
}

impl Component for BrokenA {
    fn describe(fields: &mut Fields<Self>) {
        fields.prop("host", "", |s| &s.host);
    }
}

#[derive(Default)]
struct BrokenB {
    host: Setting<String>,
}

impl Component for BrokenB {
    fn describe(fields: &mut Fields<Self>) {
        fields.prop("host", "", |s| &s.host);
    }
}

#[test]
fn test_definition_errors_are_aggregated() {
    let factory = factory();
    factory.register(Instance::new(BrokenA::default()));
    factory.register(Instance::new(BrokenB::default()));
    let err = factory.prepare_components().unwrap_err();
    match err {
        Error::Aggregate(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(|e| matches!(e, Error::PostProcessor { .. })));
        }
        other => panic!("Expected Aggregate error, got {other}"),
    }
}

struct Counting {
    visited: AtomicUsize,
}

impl Component for Counting {}

impl DefinitionRegistryPostProcessor for Counting {
    fn post_process_definition_registry(
        &self,
        _registry: &dyn DefinitionRegistry,
        _meta: &Meta,
    ) -> Result<()> {
        self.visited.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_definition_processor_visits_every_component() {
    let factory = factory();
    factory.register(
        Instance::builder(Counting { visited: AtomicUsize::new(0) })
            .implements::<dyn DefinitionRegistryPostProcessor>(|c| c)
            .build(),
    );
    factory.register(Instance::new(Gamma));
    factory.prepare_components().unwrap();

    let meta = factory
        .definition_registry()
        .get_meta_by_name(std::any::type_name::<Counting>())
        .unwrap();
    let visited = meta.raw().downcast::<Counting>().unwrap().visited.load(Ordering::SeqCst);
    assert_eq!(visited, factory.definition_registry().len());
}

// ---------------------------------------------------------------------------
// Closing
// ---------------------------------------------------------------------------

struct Closer {
    name: &'static str,
    fail: bool,
    closed: Arc<AtomicUsize>,
}

impl Component for Closer {}

impl LazyInit for Closer {}

impl NamingComponent for Closer {
    fn naming(&self) -> String {
        self.name.to_string()
    }
}

impl CloserComponent for Closer {
    fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::component(self.name, "close failed"));
        }
        Ok(())
    }
}

#[test]
fn test_close_invokes_every_created_closer() {
    let closed = Arc::new(AtomicUsize::new(0));
    let closer = |name, fail| {
        component!(
            Closer { name, fail, closed: Arc::clone(&closed) };
            dyn NamingComponent,
            dyn CloserComponent
        )
    };
    let factory = factory();
    factory.register(closer("healthy", false));
    factory.register(closer("broken", true));
    factory.register(
        Instance::builder(Closer {
            name: "never-created",
            fail: false,
            closed: Arc::clone(&closed),
        })
        .implements::<dyn NamingComponent>(|c| c)
        .implements::<dyn CloserComponent>(|c| c)
        .implements::<dyn LazyInit>(|c| c)
        .build(),
    );
    factory.refresh().unwrap();
    factory.close();

    assert_eq!(closed.load(Ordering::SeqCst), 2);
}
