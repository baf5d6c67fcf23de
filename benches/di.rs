use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_wire::*;
use std::sync::Arc;

#[derive(Default)]
struct Clock;

struct Mailer {
    _clock: Arc<Clock>,
    _retries: i64,
}

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types
        .register(TypeDescriptor::of::<Clock>().alias("Clock").default_constructible())
        .register(TypeDescriptor::of::<Mailer>().alias("Mailer").constructor(
            vec![ParamDescriptor::of::<Clock>("clock"), ParamDescriptor::int("retries").optional()],
            |_ctx, args| Ok(Mailer { _clock: args.object(0)?, _retries: args.int_or(1, 3) }),
        ));
    types
}

fn container() -> Arc<Container> {
    let config = Config::from_json(serde_json::json!({
        "mail.retries": 5,
        "di.service": {
            "clock": "Clock",
            "mailer": { "class": "Mailer", "args": ["${mail.retries}"] }
        }
    }));
    Container::builder(config).types(types()).build().unwrap()
}

// ===== Micro Benchmarks =====

fn bench_shared_hit(c: &mut Criterion) {
    let container = container();
    let _ = container.get("mailer").unwrap();

    c.bench_function("shared_hit", |b| {
        b.iter(|| {
            let v = container.get(black_box("mailer")).unwrap();
            black_box(v);
        })
    });
}

fn bench_lookup_kinds(c: &mut Criterion) {
    let container = container();
    let _ = container.get("mailer@S").unwrap();

    let mut group = c.benchmark_group("lookup_kinds");
    for id in ["mailer", "mailer@S", "mailer@", "Mailer"] {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, id| {
            b.iter(|| black_box(container.get(id).unwrap()))
        });
    }
    group.finish();
}

fn bench_startup(c: &mut Criterion) {
    let mut group = c.benchmark_group("startup");

    for &count in &[10usize, 100] {
        group.bench_with_input(BenchmarkId::new("services", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let config = Config::empty();
                    for i in 0..count {
                        // every other service depends on one declared after it
                        let class = if i % 2 == 0 { "Mailer" } else { "Clock" };
                        config.add(&format!("di.service.s{i:04}"), Value::from(class));
                    }
                    config
                },
                |config| {
                    let container = Container::builder(config).types(types()).build().unwrap();
                    black_box(container.pooled());
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_reference_resolution(c: &mut Criterion) {
    let container = container();
    let input = Value::map([
        ("retries", Value::from("${mail.retries}")),
        ("url", Value::from("smtp://host:${mail.retries}/queue")),
        ("mailer", Value::from("${#mailer}")),
        ("plain", Value::list((0..16).map(Value::from))),
    ]);

    c.bench_function("resolve_mixed_tree", |b| {
        b.iter(|| black_box(container.resolve(black_box(&input)).unwrap()))
    });
}

fn bench_autowire_match(c: &mut Criterion) {
    struct Fixed(Instance);

    impl TypeResolver for Fixed {
        fn is_instance_of(&self, value: &Value, _class: &str) -> bool {
            value.as_object().is_some_and(|o| o.is::<Clock>())
        }

        fn object_by_type(&self, _class: &str) -> DiResult<Instance> {
            Ok(self.0.clone())
        }
    }

    let params = vec![
        ParamDescriptor::of::<Clock>("clock"),
        ParamDescriptor::int("retries").optional(),
        ParamDescriptor::string("from").optional(),
    ];
    let fixed = Fixed(Instance::new(Clock));

    c.bench_function("match_arguments", |b| {
        b.iter(|| {
            let args = match_arguments(&params, vec![Value::from(2), Value::from("wow")], &fixed).unwrap();
            black_box(args);
        })
    });
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    let container = container();
    let _ = container.get("mailer").unwrap();

    for &thread_count in &[1u64, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("shared_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    std::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = &container;
                            s.spawn(move || {
                                for _ in 0..iters / threads {
                                    black_box(container.get("mailer").unwrap());
                                }
                            });
                        }
                    });
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_transient_construction(c: &mut Criterion) {
    let container = container();

    c.bench_function("transient_autowired", |b| {
        b.iter(|| black_box(container.get("mailer@").unwrap()))
    });
}

criterion_group!(
    micro_benches,
    bench_shared_hit,
    bench_lookup_kinds,
    bench_reference_resolution,
    bench_autowire_match,
    bench_contention
);

criterion_group!(macro_benches, bench_startup, bench_transient_construction);

criterion_main!(micro_benches, macro_benches);
