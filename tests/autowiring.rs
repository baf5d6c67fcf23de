use ferrous_wire::{
    match_arguments, Config, ConfigStore, Container, DiError, DiResult, Instance, ParamDescriptor, Resolver,
    TypeDescriptor, TypeRegistry, TypeResolver, Value,
};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Logger;

trait Sink: Send + Sync {}

#[derive(Debug, Default)]
struct FileSink;
impl Sink for FileSink {}

#[derive(Debug)]
struct Mailer {
    logger: Arc<Logger>,
    retries: i64,
    from: String,
}

#[derive(Debug)]
struct Audit {
    sink: Instance,
}

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types
        .register(TypeDescriptor::of::<Logger>().alias("Logger").default_constructible())
        .register(TypeDescriptor::interface_of::<dyn Sink>().alias("Sink"))
        .register(
            TypeDescriptor::of::<FileSink>()
                .alias("FileSink")
                .implements_type::<dyn Sink>()
                .default_constructible(),
        )
        .register(TypeDescriptor::of::<Mailer>().alias("Mailer").constructor(
            vec![
                ParamDescriptor::of::<Logger>("logger"),
                ParamDescriptor::int("retries").optional(),
                ParamDescriptor::string("from").optional(),
            ],
            |_ctx, args| {
                Ok(Mailer {
                    logger: args.object(0)?,
                    retries: args.int_or(1, 1),
                    from: args.string_or(2, "x"),
                })
            },
        ))
        .register(TypeDescriptor::of::<Audit>().alias("Audit").constructor(
            vec![ParamDescriptor::class("sink", "Sink")],
            |_ctx, args| Ok(Audit { sink: args.instance(0)?.clone() }),
        ));
    types
}

#[test]
fn test_supplied_scalars_follow_injected_object() {
    let config = Config::from_json(serde_json::json!({
        "di.service": {
            "logger": "Logger",
            "mailer": { "class": "Mailer", "args": [2, "wow"] }
        }
    }));
    let c = Container::builder(config).types(types()).build().unwrap();

    let mailer = c.get_as::<Mailer>("mailer").unwrap();
    assert!(Arc::ptr_eq(&mailer.logger, &c.get_as::<Logger>("logger").unwrap()));
    assert_eq!(mailer.retries, 2);
    assert_eq!(mailer.from, "wow");
}

#[test]
fn test_unbound_optional_params_use_defaults() {
    let config = Config::from_json(serde_json::json!({
        "di.service": { "logger": "Logger", "mailer": "Mailer" }
    }));
    let c = Container::builder(config).types(types()).build().unwrap();

    let mailer = c.get_as::<Mailer>("mailer").unwrap();
    assert_eq!(mailer.retries, 1);
    assert_eq!(mailer.from, "x");
}

#[test]
fn test_mistyped_argument_is_not_bound() {
    // "wow" does not fit `retries: int`; it is carried over to `from`
    let config = Config::from_json(serde_json::json!({
        "di.service": {
            "logger": "Logger",
            "mailer": { "class": "Mailer", "args": ["wow"] }
        }
    }));
    let c = Container::builder(config).types(types()).build().unwrap();

    let mailer = c.get_as::<Mailer>("mailer").unwrap();
    assert_eq!(mailer.retries, 1);
    assert_eq!(mailer.from, "wow");
}

#[test]
fn test_injection_by_interface() {
    let config = Config::from_json(serde_json::json!({
        "di.service": { "sink": "FileSink", "audit": "Audit" }
    }));
    let c = Container::builder(config).types(types()).build().unwrap();

    let audit = c.get_as::<Audit>("audit").unwrap();
    assert!(audit.sink.ptr_eq(&c.get("sink").unwrap()));
    assert!(audit.sink.is::<FileSink>());

    // the interface name reaches the indexed implementor too
    assert!(c.has("Sink"));
    assert!(c.get("Sink").unwrap().ptr_eq(&audit.sink));
}

#[test]
fn test_missing_dependency_without_autoload_fails() {
    let config = Config::empty();
    config.add("di.service.mailer", Value::from("Mailer"));
    let c = Container::builder(config)
        .types(types())
        .auto_resolve(false)
        .build()
        .unwrap();

    match c.get("mailer") {
        Err(DiError::UnresolvedType(class)) => assert!(class.ends_with("Logger")),
        other => panic!("expected UnresolvedType, got {other:?}"),
    }
    assert_eq!(c.pooled(), 0);
}

#[test]
fn test_autoload_builds_and_indexes_dependency() {
    let config = Config::empty();
    config.add("di.service.mailer", Value::from("Mailer"));
    let c = Container::builder(config)
        .types(types())
        .auto_resolve(false)
        .autoload(true)
        .build()
        .unwrap();

    let first = c.get_as::<Mailer>("mailer@").unwrap();
    let second = c.get_as::<Mailer>("mailer@").unwrap();
    assert!(Arc::ptr_eq(&first.logger, &second.logger));

    // autoloaded objects are indexed, not pooled
    assert_eq!(c.pooled(), 0);
    assert_eq!(c.indexed(), 1);
    assert!(Arc::ptr_eq(&c.get_by_type::<Logger>().unwrap(), &first.logger));
}

#[test]
fn test_autoload_skips_abstract_types() {
    let config = Config::empty();
    config.add("di.service.audit", Value::from("Audit"));
    let c = Container::builder(config)
        .types(types())
        .auto_resolve(false)
        .autoload(true)
        .build()
        .unwrap();

    assert!(matches!(c.get("audit"), Err(DiError::UnresolvedType(ref class)) if class == "Sink"));
}

#[test]
fn test_explicit_object_argument_wins_over_index() {
    let config = Config::from_json(serde_json::json!({
        "di.service": {
            "logger": "Logger",
            "other": "Logger",
            "mailer": { "class": "Mailer", "args": ["${#other}"] }
        }
    }));
    let c = Container::builder(config).types(types()).build().unwrap();

    let mailer = c.get_as::<Mailer>("mailer").unwrap();
    assert!(Arc::ptr_eq(&mailer.logger, &c.get_as::<Logger>("other").unwrap()));
    assert!(!Arc::ptr_eq(&mailer.logger, &c.get_as::<Logger>("logger").unwrap()));
}

struct Fixed(Instance);

impl TypeResolver for Fixed {
    fn is_instance_of(&self, value: &Value, _class: &str) -> bool {
        value.as_object().is_some_and(|o| o.is::<Logger>())
    }

    fn object_by_type(&self, _class: &str) -> DiResult<Instance> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_match_arguments_appends_leftovers() {
    let logger = Instance::new(Logger);
    let params = vec![ParamDescriptor::of::<Logger>("logger"), ParamDescriptor::int("n").optional()];
    let args = match_arguments(
        &params,
        vec![Value::from(1), Value::from("extra"), Value::from(true)],
        &Fixed(logger.clone()),
    )
    .unwrap();

    assert_eq!(args.len(), 4);
    assert!(args.instance(0).unwrap().ptr_eq(&logger));
    assert_eq!(args.int(1).unwrap(), 1);
    let rest: Vec<&Value> = args.rest(2).collect();
    assert_eq!(rest, vec![&Value::from("extra"), &Value::from(true)]);
}

#[test]
fn test_match_arguments_trims_trailing_unbound_slots() {
    let params = vec![
        ParamDescriptor::untyped("a"),
        ParamDescriptor::int("b").optional(),
        ParamDescriptor::string("c").optional(),
    ];
    let args = match_arguments(&params, vec![Value::from("x")], &Fixed(Instance::new(Logger))).unwrap();
    assert_eq!(args.len(), 1);
    assert!(!args.is_bound(1));
}
