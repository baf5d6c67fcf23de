//! The container: scoped object cache, startup resolution and reload.
//!
//! This module contains the [`Container`] type and its builder. The container
//! owns the object pool and the type index, reads service definitions from
//! its [`Config`], and drives the reference resolver and the factory.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::ReentrantMutex;
use tracing::{debug, info, trace, warn};

use crate::autowire::TypeResolver;
use crate::classmap::ClassMap;
use crate::config::{Config, ConfigStore, ContainerOptions};
use crate::definition::{hook_list, HookSpec, ServiceDefinition, Target};
use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::instance::Instance;
use crate::internal::{ResolutionStack, StackGuard};
use crate::key::Identifier;
use crate::observer::{DiObserver, Observers};
use crate::reference::{ReferencePattern, ReferenceResolver, ReferenceSource, ResolveMode};
use crate::registration::{TypeDescriptor, TypeRegistry};
use crate::traits::ResolverCore;
use crate::value::Value;

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::ObjectPool;

/// Identifier of the configuration object.
pub const CONFIG_ID: &str = "config";
/// Identifier of the container itself.
pub const CONTAINER_ID: &str = "container";

/// Mutable container state, guarded by the container lock.
struct State {
    pool: ObjectPool,
    classmap: ClassMap,
    /// Autoloading currently in effect; forced on while retrying at startup
    autoload: bool,
    /// Configuration tree as supplied, restored on reload
    snapshot: Value,
}

struct Shared {
    state: RefCell<State>,
    stack: RefCell<ResolutionStack>,
}

/// Container that object references and the `container` id are served by,
/// in place of the container itself.
#[derive(Clone)]
struct Delegator {
    resolver: Arc<dyn ResolverCore>,
    instance: Instance,
}

/// Configuration-driven object container.
///
/// Service definitions live under `di.service` in the configuration; every
/// lookup goes through [`get`](Container::get):
///
/// - `name` returns the shared instance, constructing it on first use;
/// - `name@` always constructs a new instance and caches nothing;
/// - `name@TAG` returns the instance shared within scope `TAG`.
///
/// Shared default-scope objects are also indexed by type, which is what
/// constructor parameters declared with a class type are autowired from.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync`. Every lookup runs under one re-entrant lock:
/// constructors and hooks may look up further objects on the same thread,
/// while other threads wait, so a shared object is never built twice.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use ferrous_wire::{Config, Container, ParamDescriptor, Resolver, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct A;
/// #[derive(Default)]
/// struct B;
/// struct C { a: Arc<A> }
///
/// let mut types = TypeRegistry::new();
/// types
///     .register(TypeDescriptor::of::<A>().alias("A").default_constructible())
///     .register(TypeDescriptor::of::<B>().alias("B").default_constructible())
///     .register(
///         TypeDescriptor::of::<C>()
///             .alias("C")
///             .constructor(vec![ParamDescriptor::of::<A>("a")], |_ctx, args| Ok(C { a: args.object(0)? })),
///     );
///
/// let config = Config::from_json(serde_json::json!({
///     "name.a": "A",
///     "di.service": {
///         "a": "${name.a}",
///         "b": { "class": "B", "args": [] },
///         "c": { "class": "C", "args": ["${#a}"] }
///     }
/// }));
/// let container = Container::builder(config).types(types).build().unwrap();
///
/// let a = container.get("a").unwrap();
/// assert!(a.ptr_eq(&container.get("a").unwrap()));
/// assert!(!a.ptr_eq(&container.get("a@").unwrap()));
/// assert!(container.get("a@S").unwrap().ptr_eq(&container.get("a@S").unwrap()));
///
/// let c = container.get_as::<C>("c@").unwrap();
/// assert!(Arc::ptr_eq(&c.a, &a.downcast::<A>().unwrap()));
/// ```
pub struct Container {
    config: Arc<Config>,
    types: TypeRegistry,
    options: ContainerOptions,
    references: ReferenceResolver,
    observers: Observers,
    lock: ReentrantMutex<Shared>,
    this: Weak<Container>,
    delegator: Option<Delegator>,
}

impl Container {
    /// Starts building a container over `config`.
    pub fn builder(config: Config) -> ContainerBuilder {
        ContainerBuilder::new(config)
    }

    /// Object for an identifier.
    ///
    /// # Errors
    ///
    /// - `NotFound` when there is no definition, bootstrap object or indexed
    ///   type for the raw id
    /// - `Circular` when the lookup re-enters an identifier under construction
    /// - any reference, autowiring or construction error of the definition
    pub fn get(&self, id: &str) -> DiResult<Instance> {
        let ident = Identifier::parse(id);
        if !self.observers.has_observers() {
            let shared = self.lock.lock();
            return self.get_locked(&shared, &ident);
        }

        let start = Instant::now();
        self.observers.resolving(&ident);
        let result = {
            let shared = self.lock.lock();
            self.get_locked(&shared, &ident)
        };
        match &result {
            Ok(_) => self.observers.resolved(&ident, start.elapsed()),
            Err(e) => self.observers.failed(&ident, e),
        }
        result
    }

    /// Whether [`get`](Container::get) can serve the identifier: a definition
    /// exists for its raw id, it is a bootstrap id, or it names a type
    /// available from the type index.
    pub fn has(&self, id: &str) -> bool {
        let ident = Identifier::parse(id);
        let raw = ident.raw();
        self.config.has(&self.options.service(raw))
            || self.bootstrap(raw).is_some()
            || self.by_type_name(raw).is_some()
    }

    /// Constructs every declared service, retrying ones whose dependencies
    /// are not available yet.
    ///
    /// Every declared service is tried once with the configured autoloading.
    /// Those failing with `UnresolvedType` or `Circular` are queued and, once
    /// the first pass is over, retried with autoloading forced on. After
    /// `retry_factor` attempts per declared service in total, the first one
    /// still failing is reported as `Configuration`. Any other error aborts
    /// immediately.
    pub fn auto_resolve(&self) -> DiResult<()> {
        let shared = self.lock.lock();
        let configured = shared.state.borrow().autoload;
        let result = self.auto_resolve_locked(&shared);
        shared.state.borrow_mut().autoload = configured;
        result
    }

    fn auto_resolve_locked(&self, shared: &Shared) -> DiResult<()> {
        let ids = self.config.keys(&self.options.service_path);
        let budget = ids.len() * self.options.retry_factor;
        let mut attempts = 0usize;

        // first pass: every id once, with the configured autoload
        let mut queue: VecDeque<(String, DiError)> = VecDeque::new();
        for id in ids {
            attempts += 1;
            match self.get(&id) {
                Ok(_) => trace!(id = %id, "resolved at startup"),
                Err(e) if e.is_deferrable() => {
                    warn!(id = %id, error = %e, "deferring service");
                    queue.push_back((id, e));
                }
                Err(e) => return Err(e),
            }
        }

        let deferred = queue.len();
        if deferred > 0 {
            shared.state.borrow_mut().autoload = true;
        }

        while let Some((id, last_error)) = queue.pop_front() {
            if attempts >= budget {
                warn!(id = %id, error = %last_error, "startup resolution gave up");
                return Err(DiError::Configuration { id, source: Box::new(last_error) });
            }
            attempts += 1;

            match self.get(&id) {
                Ok(_) => trace!(id = %id, "resolved on retry"),
                Err(e) if e.is_deferrable() => queue.push_back((id, e)),
                Err(e) => return Err(e),
            }
        }

        info!(attempts, deferred, "startup resolution complete");
        Ok(())
    }

    /// Drops every cached object and rebuilds from the configuration tree
    /// captured when the container was built.
    ///
    /// Values added through `config().add` after the build are discarded,
    /// runtime service definitions included; build a new container to keep
    /// them. The type index is kept unless `reset_classmap_on_reload` is set.
    /// Previously cached identifiers yield new instances afterwards.
    pub fn reload(&self) -> DiResult<()> {
        let shared = self.lock.lock();
        let snapshot = {
            let mut state = shared.state.borrow_mut();
            state.pool.clear();
            if self.options.reset_classmap_on_reload {
                state.classmap.clear();
            }
            state.snapshot.clone()
        };
        info!("reloading container");
        self.load(snapshot)
    }

    /// Substitutes configuration and object references in arbitrary data.
    pub fn resolve(&self, input: &Value) -> DiResult<Value> {
        self.references.resolve(input, self, ResolveMode::All)
    }

    /// Invokes a callable with autowired arguments. The callable and the
    /// arguments are reference-resolved first.
    pub fn call(&self, callable: &Value, args: Vec<Value>) -> DiResult<Value> {
        let callable = match self.resolve(callable)? {
            Value::Callable(callable) => callable,
            other => return Err(DiError::Construction(format!("{} is not callable", other.kind()))),
        };
        let args = self.resolve_args(args)?;
        let _shared = self.lock.lock();
        self.factory().execute(&callable, args)
    }

    /// A new, uncached instance of a declared service. Non-empty `args`
    /// replace the definition's arguments.
    pub fn draw(&self, id: &str, args: Vec<Value>) -> DiResult<Instance> {
        let ident = Identifier::parse(id);
        let raw = self
            .config
            .get(&self.options.service(ident.raw()))
            .filter(|v| !v.is_null())
            .ok_or_else(|| DiError::NotFound(id.to_string()))?;

        let shared = self.lock.lock();
        let _frame = StackGuard::enter(&shared.stack, &ident.to_string())?;
        let mut def = self.definition(&raw)?;
        if !args.is_empty() {
            def.args = self.resolve_args(args)?;
        }
        self.fabricate(&def)
    }

    /// An anonymous, uncached instance of a registered type.
    pub fn create(&self, type_name: &str, args: Vec<Value>) -> DiResult<Instance> {
        let args = self.resolve_args(args)?;
        let _shared = self.lock.lock();
        self.fabricate(&ServiceDefinition::new(Target::ByType(type_name.to_string())).with_args(args))
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Number of cached objects across all scopes.
    pub fn pooled(&self) -> usize {
        self.lock.lock().state.borrow().pool.len()
    }

    /// Number of objects in the type index.
    pub fn indexed(&self) -> usize {
        self.lock.lock().state.borrow().classmap.len()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let shared = self.lock.lock();
        let state = shared.state.borrow();
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str(&format!("Pooled objects: {}\n", state.pool.len()));
        for scope in state.pool.scopes() {
            let label = if scope.is_empty() { "<shared>" } else { scope };
            s.push_str(&format!("  scope {label}\n"));
        }
        s.push_str("Type index:\n");
        for name in state.classmap.type_names() {
            s.push_str(&format!("  {name}\n"));
        }
        s
    }

    fn get_locked(&self, shared: &Shared, ident: &Identifier) -> DiResult<Instance> {
        let key = ident.scope_key();
        if let Some(key) = &key {
            let hit = shared.state.borrow().pool.get(key).cloned();
            if let Some(hit) = hit {
                trace!(id = %ident, "cache hit");
                return Ok(hit);
            }
        }

        if let Some(obj) = self.bootstrap(ident.raw()) {
            return Ok(obj);
        }

        let raw = self
            .config
            .get(&self.options.service(ident.raw()))
            .filter(|v| !v.is_null());
        let Some(raw) = raw else {
            return self
                .by_type_name(ident.raw())
                .ok_or_else(|| DiError::NotFound(ident.to_string()));
        };

        let _frame = StackGuard::enter(&shared.stack, &ident.to_string())?;
        let def = self.definition(&raw)?;
        let object = self.fabricate(&def)?;

        let type_name = self.types.type_name_of(&object);
        debug!(id = %ident, type_name = %type_name, "constructed");
        self.observers.constructed(ident, &type_name);

        if let Some(key) = key {
            let mut state = shared.state.borrow_mut();
            state.pool.insert(key, object.clone());
            if ident.is_default_scope() {
                state.classmap.store(&self.types, object.clone());
            }
        }
        Ok(object)
    }

    /// Bootstrap objects served under fixed ids.
    fn bootstrap(&self, raw: &str) -> Option<Instance> {
        match raw {
            CONFIG_ID => Some(Instance::from_arc(self.config.clone())),
            CONTAINER_ID => match &self.delegator {
                Some(delegator) => Some(delegator.instance.clone()),
                None => self.this.upgrade().map(Instance::from_arc),
            },
            _ => None,
        }
    }

    /// Object satisfying a type name: a bootstrap object of that type, or
    /// one from the type index.
    fn by_type_name(&self, type_name: &str) -> Option<Instance> {
        if type_name == std::any::type_name::<Config>() {
            return self.bootstrap(CONFIG_ID);
        }
        if type_name == std::any::type_name::<Container>() {
            return self
                .bootstrap(CONTAINER_ID)
                .filter(|obj| obj.is::<Container>())
                .or_else(|| self.this.upgrade().map(Instance::from_arc));
        }
        self.lock.lock().state.borrow().classmap.get(&self.types, type_name)
    }

    /// Resolves references inside a raw definition and normalizes it.
    fn definition(&self, raw: &Value) -> DiResult<ServiceDefinition> {
        let resolved = self.references.resolve(raw, self, ResolveMode::All)?;
        ServiceDefinition::from_value(resolved)
    }

    fn common_hooks(&self) -> DiResult<Vec<HookSpec>> {
        match self.config.get(&self.options.common_path) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(raw) => hook_list(self.references.resolve(&raw, self, ResolveMode::All)?),
        }
    }

    fn resolve_args(&self, args: Vec<Value>) -> DiResult<Vec<Value>> {
        match self.resolve(&Value::List(args))? {
            Value::List(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    fn factory(&self) -> Factory<'_> {
        Factory::new(&self.types, self, self)
    }

    fn fabricate(&self, def: &ServiceDefinition) -> DiResult<Instance> {
        let common = self.common_hooks()?;
        self.factory().fabricate(def, &common)
    }

    /// Startup sequence: configuration references, eager construction, then
    /// the object references left anywhere in the tree.
    fn load(&self, snapshot: Value) -> DiResult<()> {
        let shared = self.lock.lock();

        let resolved = self.references.resolve(&snapshot, self, ResolveMode::ConfigOnly)?;
        self.config.replace_tree(resolved);

        if self.options.auto_resolve {
            self.auto_resolve()?;
        }

        let tree = self.config.tree();
        let complete = self.references.resolve(&tree, self, ResolveMode::All)?;
        self.config.replace_tree(complete);

        debug!(pooled = shared.state.borrow().pool.len(), "container loaded");
        Ok(())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("options", &self.options)
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl ResolverCore for Container {
    fn resolve_id(&self, id: &str) -> DiResult<Instance> {
        self.get(id)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.has(id)
    }

    fn resolve_value(&self, input: &Value) -> DiResult<Value> {
        self.resolve(input)
    }
}

impl ReferenceSource for Container {
    fn config_value(&self, path: &str) -> Option<Value> {
        self.config.get(path)
    }

    fn object(&self, id: &str) -> DiResult<Instance> {
        match &self.delegator {
            Some(delegator) => delegator.resolver.resolve_id(id),
            None => self.get(id),
        }
    }
}

impl TypeResolver for Container {
    fn is_instance_of(&self, value: &Value, class: &str) -> bool {
        self.types.value_is_a(value, class)
    }

    fn object_by_type(&self, class: &str) -> DiResult<Instance> {
        if let Some(obj) = self.by_type_name(class) {
            return Ok(obj);
        }

        let shared = self.lock.lock();
        let autoload = shared.state.borrow().autoload;
        let constructible = self.types.descriptor(class).is_some_and(TypeDescriptor::is_constructible);
        if !autoload || !constructible {
            return Err(DiError::UnresolvedType(class.to_string()));
        }

        let _frame = StackGuard::enter(&shared.stack, &format!("<{class}>"))?;
        debug!(type_name = class, "autoloading");
        let object = self.fabricate(&ServiceDefinition::new(Target::ByType(class.to_string())))?;
        shared.state.borrow_mut().classmap.store(&self.types, object.clone());
        Ok(object)
    }
}

/// Builder for [`Container`].
///
/// Options come from `di.options` in the configuration unless set here.
pub struct ContainerBuilder {
    config: Config,
    types: TypeRegistry,
    options: Option<ContainerOptions>,
    autoload: Option<bool>,
    auto_resolve: Option<bool>,
    pattern: ReferencePattern,
    observers: Observers,
    delegator: Option<Delegator>,
}

impl ContainerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            types: TypeRegistry::new(),
            options: None,
            autoload: None,
            auto_resolve: None,
            pattern: ReferencePattern::default(),
            observers: Observers::new(),
            delegator: None,
        }
    }

    /// Replaces the type registry.
    pub fn types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Registers one more type.
    pub fn register(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.types.register(descriptor);
        self
    }

    /// Uses these options instead of loading them from the configuration.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn autoload(mut self, enabled: bool) -> Self {
        self.autoload = Some(enabled);
        self
    }

    pub fn auto_resolve(mut self, enabled: bool) -> Self {
        self.auto_resolve = Some(enabled);
        self
    }

    pub fn reference_pattern(mut self, pattern: ReferencePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Serves `${#id}` references and the `container` id from `delegate`
    /// instead of the container being built.
    ///
    /// Lets several containers compose: a child container pointed at a
    /// parent (or at a composite of both) pulls its object references from
    /// there. Plain `get` lookups and the resolver context handed to user
    /// code still use the container itself.
    pub fn delegator<D: ResolverCore + 'static>(mut self, delegate: Arc<D>) -> Self {
        self.delegator = Some(Delegator {
            instance: Instance::from_arc(delegate.clone()),
            resolver: delegate,
        });
        self
    }

    /// Builds the container and runs the startup sequence.
    ///
    /// # Errors
    ///
    /// Any reference error in the configuration, or the error that stopped
    /// startup resolution.
    pub fn build(self) -> DiResult<Arc<Container>> {
        let mut options = self.options.unwrap_or_else(|| ContainerOptions::load(&self.config));
        if let Some(autoload) = self.autoload {
            options.autoload = autoload;
        }
        if let Some(auto_resolve) = self.auto_resolve {
            options.auto_resolve = auto_resolve;
        }

        let snapshot = self.config.tree();
        let references = ReferenceResolver::new(self.pattern, options.max_reference_depth);
        let state = State {
            pool: ObjectPool::new(),
            classmap: ClassMap::default(),
            autoload: options.autoload,
            snapshot: snapshot.clone(),
        };

        let container = Arc::new_cyclic(|this| Container {
            config: Arc::new(self.config),
            types: self.types,
            options,
            references,
            observers: self.observers,
            lock: ReentrantMutex::new(Shared {
                state: RefCell::new(state),
                stack: RefCell::new(ResolutionStack::default()),
            }),
            this: this.clone(),
            delegator: self.delegator,
        });

        info!(
            services = container.config.keys(&container.options.service_path).len(),
            types = container.types.len(),
            "building container"
        );
        container.load(snapshot)?;
        Ok(container)
    }
}
