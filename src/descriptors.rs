//! Parameter descriptors for constructors and callables.
//!
//! A descriptor is registered once per constructible type (or per callable)
//! and carries everything the autowiring matcher needs: the parameter's
//! name, its declared type if any, and whether it may be left unbound.

use crate::value::{Value, ValueKind};

/// Scalar parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    Int,
    /// Accepts integers as well
    Float,
    Str,
    List,
    Map,
    Callable,
}

impl ScalarType {
    /// Whether a supplied value's runtime kind fits this type.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value.kind()),
            (ScalarType::Bool, ValueKind::Bool)
                | (ScalarType::Int, ValueKind::Int)
                | (ScalarType::Float, ValueKind::Float | ValueKind::Int)
                | (ScalarType::Str, ValueKind::Str)
                | (ScalarType::List, ValueKind::List)
                | (ScalarType::Map, ValueKind::Map)
                | (ScalarType::Callable, ValueKind::Callable)
        )
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A class or interface name known to the type registry
    Class(String),
    Scalar(ScalarType),
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(name.into())
    }

    /// Class reference by Rust type, using its canonical registry name.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeRef::Class(std::any::type_name::<T>().to_string())
    }

    pub fn is_class(&self) -> bool {
        matches!(self, TypeRef::Class(_))
    }
}

/// One constructor or callable parameter.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ParamDescriptor, TypeRef};
///
/// struct Logger;
///
/// // (Logger $log, int $retries = 3, string ...$tags)
/// let params = vec![
///     ParamDescriptor::of::<Logger>("log"),
///     ParamDescriptor::int("retries").optional(),
///     ParamDescriptor::string("tags").variadic(),
/// ];
/// assert!(params[0].declared_type.as_ref().is_some_and(TypeRef::is_class));
/// assert!(!params[0].is_optional());
/// assert!(params[1].is_optional());
/// assert!(params[2].is_optional());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub declared_type: Option<TypeRef>,
    /// Accepts an explicit null
    pub nullable: bool,
    /// Has a default the callee applies when left unbound
    pub has_default: bool,
    /// Collects all trailing arguments
    pub variadic: bool,
}

impl ParamDescriptor {
    fn with_type(name: impl Into<String>, declared_type: Option<TypeRef>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            nullable: false,
            has_default: false,
            variadic: false,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::with_type(name, None)
    }

    /// Parameter typed with a class or interface registry name.
    pub fn class(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::with_type(name, Some(TypeRef::class(class_name)))
    }

    /// Parameter typed with a Rust type.
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::with_type(name, Some(TypeRef::of::<T>()))
    }

    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::with_type(name, Some(TypeRef::Scalar(ty)))
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Str)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Bool)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::List)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Map)
    }

    pub fn callable(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Callable)
    }

    /// Marks the parameter as having a default.
    pub fn optional(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Optional parameters may be left unbound.
    pub fn is_optional(&self) -> bool {
        self.has_default || self.variadic
    }

    /// Declared class name, if the parameter is class-typed.
    pub fn class_name(&self) -> Option<&str> {
        match &self.declared_type {
            Some(TypeRef::Class(name)) => Some(name),
            _ => None,
        }
    }
}
