use ferrous_wire::{
    Config, Container, DiError, DiObserver, Identifier, TracingObserver, TypeDescriptor, TypeRegistry,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Clock;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl DiObserver for Recorder {
    fn resolving(&self, id: &Identifier) {
        self.events.lock().push(format!("resolving {id}"));
    }

    fn resolved(&self, id: &Identifier, _duration: Duration) {
        self.events.lock().push(format!("resolved {id}"));
    }

    fn constructed(&self, id: &Identifier, type_name: &str) {
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        self.events.lock().push(format!("constructed {id} as {short}"));
    }

    fn failed(&self, id: &Identifier, error: &DiError) {
        self.events.lock().push(format!("failed {id}: {error}"));
    }
}

fn build(observer: Arc<dyn DiObserver>) -> Arc<Container> {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::of::<Clock>().alias("Clock").default_constructible());
    let config = Config::from_json(serde_json::json!({ "di.service": { "clock": "Clock" } }));
    Container::builder(config)
        .types(types)
        .auto_resolve(false)
        .observer(observer)
        .build()
        .unwrap()
}

#[test]
fn test_observer_sees_lookup_lifecycle() {
    let recorder = Arc::new(Recorder::default());
    let c = build(recorder.clone());

    c.get("clock").unwrap();
    c.get("clock").unwrap();
    let _ = c.get("missing");

    let events = recorder.events.lock().clone();
    assert_eq!(
        events,
        vec![
            "resolving clock",
            "constructed clock as Clock",
            "resolved clock",
            "resolving clock",
            "resolved clock",
            "resolving missing",
            "failed missing: Service missing not found",
        ]
    );
}

#[test]
fn test_tracing_observer_with_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ferrous_wire=trace")
        .with_test_writer()
        .try_init();

    let c = build(Arc::new(TracingObserver::with_label("test")));
    assert!(c.get("clock@").is_ok());
    assert!(c.get("nope").is_err());
}
