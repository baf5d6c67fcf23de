//! Resolver traits for object lookup.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::instance::Instance;
use crate::value::Value;

/// Core resolver trait for object-safe lookups.
///
/// Implemented by the container and by [`ResolverContext`](crate::ResolverContext),
/// which is what constructors, factories and hooks receive. Identifiers use
/// the `name`, `name@` and `name@TAG` forms.
///
/// Most users should use the [`Resolver`] trait instead, which adds typed
/// access on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Object for an identifier, honoring its scope suffix.
    fn resolve_id(&self, id: &str) -> DiResult<Instance>;

    /// Whether the identifier can be served.
    fn contains_id(&self, id: &str) -> bool;

    /// Substitutes configuration and object references in arbitrary data.
    fn resolve_value(&self, input: &Value) -> DiResult<Value>;
}

/// Typed lookups built on [`ResolverCore`].
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Config, Container, Resolver, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let mut types = TypeRegistry::new();
/// types.register(TypeDescriptor::of::<Clock>().alias("Clock").default_constructible());
///
/// let container = Container::builder(Config::from_json(serde_json::json!({"di.service": {"clock": "Clock"}})))
///     .types(types)
///     .build()
///     .unwrap();
///
/// let a = container.get_as::<Clock>("clock").unwrap();
/// let b = container.get_required_as::<Clock>("clock");
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
///
/// // lookups by type go through the type index
/// let c = container.get_by_type::<Clock>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &c));
/// ```
pub trait Resolver: ResolverCore {
    /// Object for an identifier, downcast to `T`.
    fn get_as<T: Any + Send + Sync>(&self, id: &str) -> DiResult<Arc<T>> {
        self.resolve_id(id)?.downcast::<T>()
    }

    /// Like [`get_as`](Self::get_as), panicking on failure.
    ///
    /// # Panics
    ///
    /// When the identifier cannot be resolved or is not a `T`.
    fn get_required_as<T: Any + Send + Sync>(&self, id: &str) -> Arc<T> {
        match self.get_as::<T>(id) {
            Ok(obj) => obj,
            Err(e) => panic!("failed to resolve {id} as {}: {e}", std::any::type_name::<T>()),
        }
    }

    /// Object indexed under the Rust type `T` (or a registered subtype).
    fn get_by_type<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get_as::<T>(std::any::type_name::<T>())
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
