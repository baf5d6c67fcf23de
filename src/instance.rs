//! Type-erased live objects and callables stored in the configuration tree.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::autowire::Arguments;
use crate::descriptors::ParamDescriptor;
use crate::error::{BoxError, DiError, DiResult};
use crate::provider::ResolverContext;
use crate::value::Value;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A constructed object with its concrete runtime type attached.
///
/// Cloning an `Instance` clones the inner `Arc`, so clones share identity.
/// Identity comparison (`ptr_eq`) is what the scoped cache guarantees are
/// expressed in.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::Instance;
///
/// struct Cache { size: usize }
///
/// let a = Instance::new(Cache { size: 8 });
/// let b = a.clone();
/// assert!(a.ptr_eq(&b));
/// assert_eq!(a.downcast::<Cache>().unwrap().size, 8);
/// assert!(!Instance::new(Cache { size: 8 }).ptr_eq(&a));
/// ```
#[derive(Clone)]
pub struct Instance {
    value: AnyArc,
    type_id: TypeId,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a fresh value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing `Arc`, keeping its identity.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Concrete runtime type of the object.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the object, for diagnostics.
    pub fn rust_type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the object is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the object as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Shared handle to the object as `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.value
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                found: self.type_name.to_string(),
            })
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.value) as *const (),
            Arc::as_ptr(&other.value) as *const (),
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>@{:p}", self.type_name, Arc::as_ptr(&self.value) as *const ())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

type CallableFn = dyn for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<Value, BoxError> + Send + Sync;

/// An invocable value: a factory target, a hook, or anything passed to
/// `Container::call`.
///
/// Callables declare their parameters up front so that the autowiring
/// matcher can bind supplied arguments and inject objects by type, exactly as
/// it does for registered constructors.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Callable, Config, Container, ParamDescriptor, Value};
///
/// let greet = Callable::new("greet", vec![ParamDescriptor::string("name")], |_ctx, args| {
///     Ok(Value::from(format!("hello {}", args.string(0)?)))
/// });
///
/// let container = Container::builder(Config::empty()).build().unwrap();
/// let out = container.call(&Value::Callable(greet), vec![Value::from("wire")]).unwrap();
/// assert_eq!(out, Value::from("hello wire"));
/// ```
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    params: Arc<[ParamDescriptor]>,
    func: Arc<CallableFn>,
}

impl Callable {
    /// Creates a callable with the given parameter list.
    pub fn new<F>(name: impl Into<String>, params: Vec<ParamDescriptor>, f: F) -> Self
    where
        F: for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            params: params.into(),
            func: Arc::new(f),
        }
    }

    /// Creates a callable producing a new `T` object, suitable as a factory
    /// target.
    pub fn producing<T, F>(name: impl Into<String>, params: Vec<ParamDescriptor>, f: F) -> Self
    where
        T: Any + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::new(name, params, move |ctx, args| {
            f(ctx, args).map(|obj| Value::Object(Instance::new(obj)))
        })
    }

    /// Diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters.
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub(crate) fn invoke(&self, ctx: &ResolverContext<'_>, args: Arguments) -> Result<Value, BoxError> {
        (self.func)(ctx, args)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable<{}>({} params)", self.name, self.params.len())
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Probe(u32);

    #[test]
    fn clones_share_identity() {
        let a = Instance::new(Probe(1));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(a.is::<Probe>());
        assert_eq!(a.downcast_ref::<Probe>().map(|p| p.0), Some(1));
    }

    #[test]
    fn from_arc_keeps_pointer() {
        let arc = Arc::new(Probe(2));
        let inst = Instance::from_arc(arc.clone());
        let back = inst.downcast::<Probe>().unwrap();
        assert!(Arc::ptr_eq(&arc, &back));
    }

    #[test]
    fn downcast_to_wrong_type_is_mismatch() {
        let inst = Instance::new(Probe(3));
        match inst.downcast::<String>() {
            Err(DiError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "alloc::string::String");
                assert!(found.ends_with("Probe"));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }
}
