use ferrous_wire::{global, Config, Container, DiError, Instance, TypeDescriptor, TypeRegistry};
use serial_test::serial;

#[derive(Debug, Default)]
struct Mailer;

fn container() -> std::sync::Arc<Container> {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::of::<Mailer>().alias("Mailer").default_constructible());
    let config = Config::from_json(serde_json::json!({ "di.service": { "mailer": "Mailer" } }));
    Container::builder(config).types(types).build().unwrap()
}

#[test]
#[serial]
fn test_uninitialized_registry() {
    global::teardown();
    assert!(!global::is_initialized());
    assert!(matches!(global::container(), Err(DiError::NotInitialized)));
    assert!(matches!(global::get("mailer"), Err(DiError::NotInitialized)));
}

#[test]
#[serial]
fn test_static_lookup_reaches_container() {
    global::teardown();
    let c = container();
    global::init(c.clone()).unwrap();

    let mailer = global::get("mailer").unwrap();
    assert!(mailer.is::<Mailer>());
    assert!(mailer.ptr_eq(&c.get("mailer").unwrap()));
    assert!(!global::get("mailer@").unwrap().ptr_eq(&mailer));

    global::teardown();
}

#[test]
#[serial]
fn test_double_init_is_rejected() {
    global::teardown();
    global::init(container()).unwrap();
    assert!(matches!(global::init(container()), Err(DiError::AlreadyInitialized)));
    global::teardown();
    assert!(global::init(container()).is_ok());
    global::teardown();
}

#[test]
#[serial]
fn test_aliases_take_precedence() {
    global::teardown();
    global::init(container()).unwrap();

    let custom = Instance::new(Mailer);
    global::set_alias("mailer", custom.clone()).unwrap();
    assert!(global::get("mailer").unwrap().ptr_eq(&custom));
    assert!(matches!(
        global::set_alias("mailer", Instance::new(Mailer)),
        Err(DiError::Definition(_))
    ));

    // aliases work without a container too
    global::teardown();
    global::set_alias("solo", custom.clone()).unwrap();
    assert!(global::get("solo").unwrap().ptr_eq(&custom));
    global::teardown();
}
