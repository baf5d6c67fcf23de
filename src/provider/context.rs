//! Resolver context handed to user code.

use crate::error::DiResult;
use crate::instance::Instance;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Context passed to constructors, factories and hooks.
///
/// Wraps the container serving the current lookup, so user code can fetch
/// further objects while it is being built. Nested lookups run on the same
/// thread under the container's re-entrant lock; a lookup that leads back to
/// an identifier still under construction fails with `Circular`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use ferrous_wire::{Config, Container, Resolver, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct Pool;
/// struct Repo { pool: Arc<Pool> }
///
/// let mut types = TypeRegistry::new();
/// types.register(TypeDescriptor::of::<Pool>().alias("Pool").default_constructible());
/// types.register(
///     TypeDescriptor::of::<Repo>()
///         .alias("Repo")
///         .constructor(vec![], |ctx, _args| Ok(Repo { pool: ctx.get_as::<Pool>("pool")? })),
/// );
///
/// let config = Config::from_json(serde_json::json!({
///     "di.service": { "pool": "Pool", "repo": "Repo" }
/// }));
/// let container = Container::builder(config).types(types).build().unwrap();
///
/// let repo = container.get_as::<Repo>("repo").unwrap();
/// assert!(Arc::ptr_eq(&repo.pool, &container.get_as::<Pool>("pool").unwrap()));
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(resolver: &'a dyn ResolverCore) -> Self {
        Self { resolver }
    }

    /// Untyped lookup.
    pub fn get(&self, id: &str) -> DiResult<Instance> {
        self.resolver.resolve_id(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.resolver.contains_id(id)
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_id(&self, id: &str) -> DiResult<Instance> {
        self.resolver.resolve_id(id)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.resolver.contains_id(id)
    }

    fn resolve_value(&self, input: &Value) -> DiResult<Value> {
        self.resolver.resolve_value(input)
    }
}
