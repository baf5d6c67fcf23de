//! # ferrous-wire
//!
//! Configuration-driven object graphs for Rust: declare which objects exist and
//! how they relate, and let the container build, cache and wire them.
//!
//! ## Features
//!
//! - **References**: `${path}` pulls configuration values, `${#id}` pulls objects
//! - **Scoped caching**: shared (`id`), transient (`id@`) and tagged (`id@TAG`) lookups
//! - **Autowiring**: class-typed constructor parameters are injected by type
//! - **Hooks**: `before`/`after` callables and methods around construction
//! - **Startup resolution**: every declared service is built eagerly, in any order
//! - **Circular dependency detection**: re-entrant lookups fail with the full path
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ferrous_wire::{Config, Container, ParamDescriptor, Resolver, TypeDescriptor, TypeRegistry};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut types = TypeRegistry::new();
//! types
//!     .register(
//!         TypeDescriptor::of::<Database>()
//!             .alias("Database")
//!             .constructor(vec![ParamDescriptor::string("url")], |_ctx, args| {
//!                 Ok(Database { url: args.string(0)? })
//!             }),
//!     )
//!     .register(
//!         TypeDescriptor::of::<UserService>()
//!             .alias("UserService")
//!             .constructor(vec![ParamDescriptor::of::<Database>("db")], |_ctx, args| {
//!                 Ok(UserService { db: args.object(0)? })
//!             }),
//!     );
//!
//! let config = Config::from_json(serde_json::json!({
//!     "db": { "url": "postgres://localhost" },
//!     "di": {
//!         "service": {
//!             "db": { "class": "Database", "args": ["${db.url}"] },
//!             "users": "UserService" // Database is injected by type
//!         }
//!     }
//! }));
//!
//! let container = Container::builder(config).types(types).build().unwrap();
//! let users = container.get_as::<UserService>("users").unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Identifiers
//!
//! - `cache` - shared: built once, then returned until [`Container::reload`]
//! - `cache@` - transient: a new object on every lookup, never cached
//! - `cache@SESSION` - shared within the `SESSION` scope only
//!
//! Shared objects are also indexed by their type, so a constructor parameter
//! declared as `ParamDescriptor::of::<Cache>(..)` receives the shared cache
//! without being told about it.
//!
//! ## Hooks
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use ferrous_wire::{Config, ConfigStore, Container, Resolver, TypeDescriptor, TypeRegistry, Value};
//!
//! #[derive(Default)]
//! struct Cache {
//!     warmed: AtomicUsize,
//! }
//!
//! let mut types = TypeRegistry::new();
//! types.register(
//!     TypeDescriptor::of::<Cache>()
//!         .alias("Cache")
//!         .default_constructible()
//!         .method("warm", vec![], |cache, _ctx, _args| {
//!             cache.warmed.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         }),
//! );
//!
//! let config = Config::empty();
//! config.add(
//!     "di.service.cache",
//!     Value::map([
//!         ("class", Value::from("Cache")),
//!         ("after", Value::list([Value::from("warm")])),
//!     ]),
//! );
//!
//! let container = Container::builder(config).types(types).build().unwrap();
//! let cache = container.get_as::<Cache>("cache").unwrap();
//! assert_eq!(cache.warmed.load(Ordering::SeqCst), 1);
//! ```

// Module declarations
pub mod autowire;
pub mod classmap;
pub mod config;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod global;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod reference;
pub mod traits;
pub mod value;

// Internal modules
mod factory;
mod internal;
mod registration;

// Re-exports
pub use autowire::{match_arguments, Arguments, TypeResolver};
pub use classmap::ClassMap;
pub use config::{Config, ConfigStore, ContainerOptions};
pub use definition::{HookSpec, HookTarget, ServiceDefinition, Target};
pub use descriptors::{ParamDescriptor, ScalarType, TypeRef};
pub use error::{BoxError, DiError, DiResult};
pub use instance::{Callable, Instance};
pub use key::{Identifier, ScopeKey};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use provider::{Container, ContainerBuilder, ObjectPool, ResolverContext, CONFIG_ID, CONTAINER_ID};
pub use reference::{ReferencePattern, ReferenceResolver, ReferenceSource, ResolveMode};
pub use registration::{TypeBuilder, TypeDescriptor, TypeRegistry};
pub use traits::{Resolver, ResolverCore};
pub use value::{Value, ValueKind};
