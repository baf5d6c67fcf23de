//! Type registration: the static stand-in for class reflection.
//!
//! Configuration names types by string. Every type that may appear as a
//! construction target, as a class-typed parameter, or as an interface in a
//! type index lookup is described once here: its names, its supertypes, how to
//! build it and which methods hooks may call on it.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::autowire::Arguments;
use crate::descriptors::ParamDescriptor;
use crate::error::BoxError;
use crate::instance::Instance;
use crate::internal::FastMap;
use crate::provider::ResolverContext;
use crate::value::Value;

type ConstructorFn = dyn for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<Instance, BoxError> + Send + Sync;
type DefaultFn = dyn Fn() -> Instance + Send + Sync;
type MethodFn = dyn for<'a> Fn(&ResolverContext<'a>, &Instance, Arguments) -> Result<(), BoxError> + Send + Sync;

/// How instances of a registered type come to exist.
#[derive(Clone)]
pub(crate) enum Construction {
    /// Interfaces and types only ever supplied as live objects
    Abstract,
    /// No constructor: instantiated from `Default`
    Default(Arc<DefaultFn>),
    Constructor {
        params: Arc<[ParamDescriptor]>,
        ctor: Arc<ConstructorFn>,
    },
}

/// A method hooks can call by name.
#[derive(Clone)]
pub(crate) struct Method {
    pub(crate) params: Arc<[ParamDescriptor]>,
    pub(crate) func: Arc<MethodFn>,
}

fn ctor_fn<F>(f: F) -> Arc<ConstructorFn>
where
    F: for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn method_fn<F>(f: F) -> Arc<MethodFn>
where
    F: for<'a> Fn(&ResolverContext<'a>, &Instance, Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Registration record for one class or interface.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    type_id: Option<TypeId>,
    aliases: Vec<String>,
    supertypes: Vec<String>,
    pub(crate) construction: Construction,
    pub(crate) methods: FastMap<String, Method>,
}

impl TypeDescriptor {
    /// Interface (or abstract class) known only by name.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
            aliases: Vec::new(),
            supertypes: Vec::new(),
            construction: Construction::Abstract,
            methods: FastMap::default(),
        }
    }

    /// Interface named after a Rust type, typically a `dyn Trait`.
    pub fn interface_of<T: ?Sized + 'static>() -> Self {
        Self::interface(std::any::type_name::<T>())
    }

    /// Canonical registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Direct supertypes (interfaces and parents).
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Concrete Rust type, `None` for interfaces.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Whether the factory can build this type from its name.
    pub fn is_constructible(&self) -> bool {
        !matches!(self.construction, Construction::Abstract)
    }

    /// Constructor parameters; `None` when there is no constructor.
    pub fn constructor_params(&self) -> Option<&[ParamDescriptor]> {
        match &self.construction {
            Construction::Constructor { params, .. } => Some(&params[..]),
            _ => None,
        }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Adds a short name usable in configuration.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declares a supertype or implemented interface by name.
    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    /// Declares an implemented interface by Rust type.
    pub fn implements_type<I: ?Sized + 'static>(self) -> Self {
        self.implements(std::any::type_name::<I>())
    }
}

/// Typed builder for a concrete [`TypeDescriptor`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Mutex;
/// use ferrous_wire::{ParamDescriptor, TypeDescriptor, TypeRegistry};
///
/// trait Store: Send + Sync {}
///
/// #[derive(Default)]
/// struct Memory;
/// impl Store for Memory {}
///
/// struct Cache {
///     store: std::sync::Arc<Memory>,
///     ttl: i64,
///     hits: Mutex<u64>,
/// }
///
/// let mut types = TypeRegistry::new();
/// types.register(TypeDescriptor::interface_of::<dyn Store>().alias("Store"));
/// types.register(
///     TypeDescriptor::of::<Memory>()
///         .alias("Memory")
///         .implements_type::<dyn Store>()
///         .default_constructible(),
/// );
/// types.register(
///     TypeDescriptor::of::<Cache>()
///         .alias("Cache")
///         .constructor(
///             vec![ParamDescriptor::of::<Memory>("store"), ParamDescriptor::int("ttl").optional()],
///             |_ctx, args| {
///                 Ok(Cache { store: args.object(0)?, ttl: args.int_or(1, 60), hits: Mutex::new(0) })
///             },
///         )
///         .method("reset", vec![], |cache, _ctx, _args| {
///             *cache.hits.lock().unwrap() = 0;
///             Ok(())
///         }),
/// );
///
/// assert!(types.is_a("Memory", "Store"));
/// assert!(!types.is_a("Cache", "Store"));
/// assert!(types.descriptor("Cache").unwrap().has_method("reset"));
/// ```
pub struct TypeBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl TypeDescriptor {
    /// Starts describing the concrete type `T`, canonically named by
    /// `std::any::type_name::<T>()`.
    pub fn of<T: Any + Send + Sync>() -> TypeBuilder<T> {
        TypeBuilder {
            descriptor: Self {
                name: std::any::type_name::<T>().to_string(),
                type_id: Some(TypeId::of::<T>()),
                aliases: Vec::new(),
                supertypes: Vec::new(),
                construction: Construction::Abstract,
                methods: FastMap::default(),
            },
            _marker: PhantomData,
        }
    }
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.alias(alias);
        self
    }

    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.implements(name);
        self
    }

    pub fn implements_type<I: ?Sized + 'static>(mut self) -> Self {
        self.descriptor = self.descriptor.implements_type::<I>();
        self
    }

    /// The type has no constructor; instances come from `Default`.
    pub fn default_constructible(mut self) -> Self
    where
        T: Default,
    {
        self.descriptor.construction = Construction::Default(Arc::new(|| Instance::new(T::default())));
        self
    }

    /// Constructor with an autowirable parameter list.
    pub fn constructor<F>(mut self, params: Vec<ParamDescriptor>, f: F) -> Self
    where
        F: for<'a> Fn(&ResolverContext<'a>, Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.descriptor.construction = Construction::Constructor {
            params: params.into(),
            ctor: ctor_fn(move |ctx, args| f(ctx, args).map(Instance::new)),
        };
        self
    }

    /// Method callable from hooks by name.
    pub fn method<F>(mut self, name: impl Into<String>, params: Vec<ParamDescriptor>, f: F) -> Self
    where
        F: for<'a> Fn(&T, &ResolverContext<'a>, Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        let func = method_fn(move |ctx, target, args| {
            let this = target
                .downcast_ref::<T>()
                .ok_or_else(|| format!("method {label} called on {}", target.rust_type_name()))?;
            f(this, ctx, args)
        });
        self.descriptor.methods.insert(name, Method { params: params.into(), func });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<T: Any + Send + Sync> From<TypeBuilder<T>> for TypeDescriptor {
    fn from(builder: TypeBuilder<T>) -> Self {
        builder.build()
    }
}

/// Registry of all types the container can name, build and match.
///
/// Names resolve through aliases to a canonical name. Assignability
/// (`is_a`) follows declared supertypes transitively.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: FastMap<String, TypeDescriptor>,
    aliases: FastMap<String, String>,
    by_type_id: FastMap<TypeId, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a type.
    pub fn register(&mut self, descriptor: impl Into<TypeDescriptor>) -> &mut Self {
        let descriptor = descriptor.into();
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), descriptor.name.clone());
        }
        if let Some(id) = descriptor.type_id {
            self.by_type_id.insert(id, descriptor.name.clone());
        }
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Canonical name for a name or alias, if registered.
    pub fn canonical<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.types.contains_key(name) {
            Some(name)
        } else {
            self.aliases.get(name).map(String::as_str)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.canonical(name).and_then(|n| self.types.get(n))
    }

    /// Descriptor of the concrete type of a live object.
    pub fn descriptor_of(&self, instance: &Instance) -> Option<&TypeDescriptor> {
        self.by_type_id
            .get(&instance.type_id())
            .and_then(|name| self.types.get(name))
    }

    /// Name an object is indexed under: its registered canonical name, or
    /// its Rust type name when unregistered.
    pub fn type_name_of(&self, instance: &Instance) -> String {
        self.by_type_id
            .get(&instance.type_id())
            .cloned()
            .unwrap_or_else(|| instance.rust_type_name().to_string())
    }

    /// Whether `concrete` is `target` or one of its (transitive) subtypes.
    pub fn is_a(&self, concrete: &str, target: &str) -> bool {
        let concrete = self.canonical(concrete).unwrap_or(concrete);
        let target = self.canonical(target).unwrap_or(target);
        let mut pending = vec![concrete];
        let mut seen: Vec<&str> = Vec::new();
        while let Some(name) = pending.pop() {
            if name == target {
                return true;
            }
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            if let Some(descriptor) = self.types.get(name) {
                pending.extend(
                    descriptor
                        .supertypes
                        .iter()
                        .map(|s| self.canonical(s).unwrap_or(s.as_str())),
                );
            }
        }
        false
    }

    /// Whether a value is an object assignable to `target`.
    pub fn value_is_a(&self, value: &Value, target: &str) -> bool {
        match value {
            Value::Object(obj) => self.is_a(&self.type_name_of(obj), target),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {}

    #[derive(Default)]
    struct Square;
    impl Shape for Square {}

    #[derive(Default)]
    struct Tile;

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types
            .register(TypeDescriptor::interface("Drawable"))
            .register(TypeDescriptor::interface_of::<dyn Shape>().alias("Shape").implements("Drawable"))
            .register(
                TypeDescriptor::of::<Square>()
                    .alias("Square")
                    .implements_type::<dyn Shape>()
                    .default_constructible(),
            )
            .register(TypeDescriptor::of::<Tile>().alias("Tile"));
        types
    }

    #[test]
    fn aliases_resolve_to_canonical_names() {
        let types = registry();
        assert_eq!(types.canonical("Square"), Some(std::any::type_name::<Square>()));
        assert!(types.contains(std::any::type_name::<Square>()));
        assert_eq!(types.canonical("Circle"), None);
    }

    #[test]
    fn assignability_is_transitive() {
        let types = registry();
        assert!(types.is_a("Square", "Square"));
        assert!(types.is_a("Square", "Shape"));
        assert!(types.is_a("Square", "Drawable"));
        assert!(!types.is_a("Tile", "Shape"));
        assert!(!types.is_a("Shape", "Square"));
    }

    #[test]
    fn objects_are_named_by_registration() {
        let types = registry();
        let sq = Instance::new(Square);
        assert_eq!(types.type_name_of(&sq), std::any::type_name::<Square>());
        assert!(types.value_is_a(&Value::Object(sq), "Drawable"));
        assert!(!types.value_is_a(&Value::from("Square"), "Square"));

        let unregistered = Instance::new(5u8);
        assert_eq!(types.type_name_of(&unregistered), "u8");
    }

    #[test]
    fn constructibility() {
        let types = registry();
        assert!(types.descriptor("Square").unwrap().is_constructible());
        assert!(!types.descriptor("Tile").unwrap().is_constructible());
        assert!(!types.descriptor("Shape").unwrap().is_constructible());
        assert!(types.descriptor("Square").unwrap().constructor_params().is_none());
    }
}
