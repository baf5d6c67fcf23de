//! Autowiring: matching supplied arguments and indexed objects against a
//! parameter list.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::descriptors::{ParamDescriptor, TypeRef};
use crate::error::{BoxError, DiResult};
use crate::instance::Instance;
use crate::value::Value;

/// Type-directed lookups the matcher needs from its host.
///
/// The container implements this on top of its type registry, type index and
/// factory; tests can supply a fixed table.
pub trait TypeResolver {
    /// Whether `value` is an object whose runtime type is `class` or a
    /// subtype/implementor of it.
    fn is_instance_of(&self, value: &Value, class: &str) -> bool;

    /// An object satisfying `class`: an indexed one, or a freshly built one
    /// when autoloading is enabled. Fails with `UnresolvedType` otherwise.
    fn object_by_type(&self, class: &str) -> DiResult<Instance>;
}

/// Final argument list handed to a constructor or callable.
///
/// Positional slots may be unbound, in which case the callee applies its own
/// default. Arguments left over after positional matching follow the last
/// slot, for variadic parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    slots: SmallVec<[Option<Value>; 4]>,
}

impl Arguments {
    /// All-bound argument list.
    pub fn new(values: Vec<Value>) -> Self {
        Self { slots: values.into_iter().map(Some).collect() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bound value at `index`, `None` when unbound or out of range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Required value at `index`.
    pub fn value(&self, index: usize) -> Result<&Value, BoxError> {
        self.get(index)
            .ok_or_else(|| format!("Too few arguments: nothing bound at position {index}").into())
    }

    pub fn instance(&self, index: usize) -> Result<&Instance, BoxError> {
        let value = self.value(index)?;
        value
            .as_object()
            .ok_or_else(|| format!("argument {index}: expected object, got {}", value.kind()).into())
    }

    /// Required object argument, downcast to `T`.
    pub fn object<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, BoxError> {
        Ok(self.instance(index)?.downcast::<T>()?)
    }

    pub fn string(&self, index: usize) -> Result<String, BoxError> {
        let value = self.value(index)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("argument {index}: expected string, got {}", value.kind()).into())
    }

    pub fn string_or(&self, index: usize, default: &str) -> String {
        self.get(index)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn int(&self, index: usize) -> Result<i64, BoxError> {
        let value = self.value(index)?;
        value
            .as_i64()
            .ok_or_else(|| format!("argument {index}: expected int, got {}", value.kind()).into())
    }

    pub fn int_or(&self, index: usize, default: i64) -> i64 {
        self.get(index).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn float_or(&self, index: usize, default: f64) -> f64 {
        self.get(index).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn bool_or(&self, index: usize, default: bool) -> bool {
        self.get(index).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Bound values from `from` onwards, for variadic parameters.
    pub fn rest(&self, from: usize) -> impl Iterator<Item = &Value> {
        self.slots.iter().skip(from).flatten()
    }

    /// Flattens to plain values; unbound slots become `Null`.
    pub fn into_values(self) -> Vec<Value> {
        self.slots.into_iter().map(Option::unwrap_or_default).collect()
    }
}

/// Matches `provided` arguments against `params`, injecting objects by type
/// where a class-typed parameter is not covered by a supplied argument.
///
/// For each parameter, left to right:
///
/// 1. the front supplied argument is bound when the parameter is untyped, the
///    argument's runtime type fits, or it is an explicit null for a nullable
///    parameter;
/// 2. otherwise a class-typed parameter that is required (or still has
///    supplied arguments queued behind it) is resolved by type;
/// 3. otherwise the slot stays unbound.
///
/// Leftover supplied arguments are appended after the positional slots.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::autowire::{match_arguments, TypeResolver};
/// use ferrous_wire::{DiResult, Instance, ParamDescriptor, Value};
///
/// struct Clock;
///
/// struct OneClock(Instance);
/// impl TypeResolver for OneClock {
///     fn is_instance_of(&self, value: &Value, _class: &str) -> bool {
///         value.as_object().is_some_and(|o| o.is::<Clock>())
///     }
///     fn object_by_type(&self, _class: &str) -> DiResult<Instance> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let clock = Instance::new(Clock);
/// let params = vec![
///     ParamDescriptor::of::<Clock>("clock"),
///     ParamDescriptor::int("i").optional(),
///     ParamDescriptor::string("s").optional(),
/// ];
/// let args = match_arguments(&params, vec![Value::from(2), Value::from("wow")], &OneClock(clock.clone())).unwrap();
/// assert!(args.instance(0).unwrap().ptr_eq(&clock));
/// assert_eq!(args.int(1).unwrap(), 2);
/// assert_eq!(args.string(2).unwrap(), "wow");
/// ```
pub fn match_arguments(
    params: &[ParamDescriptor],
    provided: Vec<Value>,
    types: &dyn TypeResolver,
) -> DiResult<Arguments> {
    let mut queue: VecDeque<Value> = provided.into();
    let mut slots: SmallVec<[Option<Value>; 4]> = SmallVec::with_capacity(params.len());

    for param in params {
        if is_type_matched(param, queue.front(), types) {
            slots.push(queue.pop_front());
        } else if let Some(class) = required_class(param, &queue) {
            slots.push(Some(Value::Object(types.object_by_type(class)?)));
        } else {
            slots.push(None);
        }
    }

    while matches!(slots.last(), Some(None)) {
        slots.pop();
    }
    slots.extend(queue.into_iter().map(Some));

    Ok(Arguments { slots })
}

fn is_type_matched(param: &ParamDescriptor, front: Option<&Value>, types: &dyn TypeResolver) -> bool {
    let Some(front) = front else {
        return false;
    };
    match &param.declared_type {
        None => true,
        Some(_) if front.is_null() => param.nullable,
        Some(TypeRef::Class(class)) => types.is_instance_of(front, class),
        Some(TypeRef::Scalar(scalar)) => scalar.accepts(front),
    }
}

fn required_class<'p>(param: &'p ParamDescriptor, queue: &VecDeque<Value>) -> Option<&'p str> {
    let class = param.class_name()?;
    (!param.is_optional() || !queue.is_empty()).then_some(class)
}
