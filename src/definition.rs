//! Service definitions as read from the configuration tree.
//!
//! Definitions are written in shorthand or map form:
//!
//! ```yaml
//! di:
//!   service:
//!     clock: Clock                 # type name
//!     cache:
//!       class: Cache               # type name, callable or live object
//!       args: ["${#clock}", 60]
//!       before: [audit]            # callables only
//!       after:
//!         - warm                   # method on the new object
//!         - [resize, [128]]        # method with arguments
//! ```
//!
//! Everything is normalized once into [`ServiceDefinition`] so the factory
//! dispatches on a closed sum instead of re-inspecting values.

use std::fmt;

use crate::error::{DiError, DiResult};
use crate::instance::{Callable, Instance};
use crate::value::Value;

/// Definition map keys.
pub const KEY_CLASS: &str = "class";
pub const KEY_ARGS: &str = "args";
pub const KEY_BEFORE: &str = "before";
pub const KEY_AFTER: &str = "after";

/// What produces the object.
#[derive(Clone, PartialEq)]
pub enum Target {
    /// A registered type, constructed with autowired arguments
    ByType(String),
    /// A callable returning the object
    ByFactory(Callable),
    /// An already-built object
    ByValue(Instance),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::ByType(name) => write!(f, "ByType({name})"),
            Target::ByFactory(c) => write!(f, "ByFactory({})", c.name()),
            Target::ByValue(obj) => write!(f, "ByValue({})", obj.rust_type_name()),
        }
    }
}

impl Target {
    fn from_value(value: Value) -> DiResult<Self> {
        match value {
            Value::Str(name) => Ok(Target::ByType(name)),
            Value::Callable(c) => Ok(Target::ByFactory(c)),
            Value::Object(obj) => Ok(Target::ByValue(obj)),
            other => Err(DiError::Definition(format!(
                "{} is not a type name, callable or object",
                other.kind()
            ))),
        }
    }
}

/// What a hook invokes.
#[derive(Debug, Clone, PartialEq)]
pub enum HookTarget {
    /// Method of the constructed object, by registered name
    Method(String),
    Callable(Callable),
}

/// One `before`/`after`/common hook line.
#[derive(Debug, Clone, PartialEq)]
pub struct HookSpec {
    pub target: HookTarget,
    /// Declared arguments; `None` when the line has none
    pub args: Option<Vec<Value>>,
}

impl HookSpec {
    pub fn method(name: impl Into<String>) -> Self {
        Self { target: HookTarget::Method(name.into()), args: None }
    }

    pub fn callable(callable: Callable) -> Self {
        Self { target: HookTarget::Callable(callable), args: None }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Normalizes a hook line: `name`, a callable, or `[callee, args]`.
    pub fn from_value(line: Value) -> DiResult<Self> {
        match line {
            Value::Str(name) => Ok(Self::method(name)),
            Value::Callable(c) => Ok(Self::callable(c)),
            Value::List(items) => {
                let mut items = items.into_iter();
                let head = items
                    .next()
                    .ok_or_else(|| DiError::Definition("empty hook line".to_string()))?;
                let mut spec = Self::from_value(head)?;
                if let Some(args) = items.next() {
                    spec.args = Some(arg_list(args));
                }
                if items.next().is_some() {
                    return Err(DiError::Definition(
                        "hook line takes at most a callee and an argument list".to_string(),
                    ));
                }
                Ok(spec)
            }
            other => Err(DiError::Definition(format!("bad hook line of kind {}", other.kind()))),
        }
    }
}

/// Normalizes a list of hook lines; a single line may stand alone.
pub fn hook_list(value: Value) -> DiResult<Vec<HookSpec>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(lines) => lines.into_iter().map(HookSpec::from_value).collect(),
        single => Ok(vec![HookSpec::from_value(single)?]),
    }
}

fn arg_list(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

/// Canonical service definition.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::definition::{HookTarget, ServiceDefinition, Target};
/// use ferrous_wire::Value;
///
/// let def = ServiceDefinition::from_value(Value::from("Clock")).unwrap();
/// assert_eq!(def.target, Target::ByType("Clock".into()));
/// assert!(def.args.is_empty());
///
/// let def = ServiceDefinition::from_value(Value::map([
///     ("class", Value::from("Cache")),
///     ("args", Value::list([Value::from(60)])),
///     ("after", Value::list([Value::from("warm")])),
/// ]))
/// .unwrap();
/// assert_eq!(def.args, vec![Value::from(60)]);
/// assert_eq!(def.after[0].target, HookTarget::Method("warm".into()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefinition {
    pub target: Target,
    pub args: Vec<Value>,
    pub before: Vec<HookSpec>,
    pub after: Vec<HookSpec>,
}

impl ServiceDefinition {
    pub fn new(target: Target) -> Self {
        Self { target, args: Vec::new(), before: Vec::new(), after: Vec::new() }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Normalizes shorthand and map forms.
    pub fn from_value(value: Value) -> DiResult<Self> {
        match value {
            Value::Map(mut map) => {
                let class = map
                    .remove(KEY_CLASS)
                    .ok_or_else(|| DiError::Definition(format!("definition map has no `{KEY_CLASS}` key")))?;
                let args = map.remove(KEY_ARGS).map(arg_list).unwrap_or_default();
                let before = map.remove(KEY_BEFORE).map(hook_list).transpose()?.unwrap_or_default();
                let after = map.remove(KEY_AFTER).map(hook_list).transpose()?.unwrap_or_default();
                Ok(Self { target: Target::from_value(class)?, args, before, after })
            }
            other => Ok(Self::new(Target::from_value(other)?)),
        }
    }
}
