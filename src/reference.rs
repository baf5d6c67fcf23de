//! Reference resolution over configuration trees.
//!
//! Two token kinds are recognized inside string values:
//!
//! - `${path.to.key}` - a configuration lookup by dotted path
//! - `${#service}` - an object lookup through the container
//!
//! A string that is exactly one token is replaced by the looked-up value,
//! whatever its shape. Tokens embedded in longer text are interpolated and
//! must resolve to scalars.

use std::collections::BTreeMap;

use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::value::Value;

/// Token delimiters and the object marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePattern {
    pub start: String,
    pub end: String,
    pub object_marker: char,
}

impl Default for ReferencePattern {
    fn default() -> Self {
        Self {
            start: "${".to_string(),
            end: "}".to_string(),
            object_marker: '#',
        }
    }
}

impl ReferencePattern {
    pub fn new(start: impl Into<String>, end: impl Into<String>, object_marker: char) -> Self {
        Self { start: start.into(), end: end.into(), object_marker }
    }

    /// Whether `text` contains anything that looks like a token start.
    pub fn may_contain_token(&self, text: &str) -> bool {
        text.contains(self.start.as_str())
    }
}

/// Lookups a resolution pass is performed against.
pub trait ReferenceSource {
    /// Raw (unresolved) configuration value at `path`.
    fn config_value(&self, path: &str) -> Option<Value>;

    /// Object registered under `id`.
    fn object(&self, id: &str) -> DiResult<Instance>;
}

/// Which token kinds a pass substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Substitute configuration tokens, leave object tokens as text
    ConfigOnly,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Config(&'a str),
    Object(&'a str),
}

#[derive(Debug)]
enum Segment<'a> {
    Text(&'a str),
    Ref { token: Token<'a>, raw: &'a str },
}

/// Stateless resolver producing a new tree with tokens substituted.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::reference::{ReferenceResolver, ReferenceSource, ResolveMode};
/// use ferrous_wire::{DiError, DiResult, Instance, Value};
///
/// struct Env(Value);
/// impl ReferenceSource for Env {
///     fn config_value(&self, path: &str) -> Option<Value> {
///         self.0.get_path(path).cloned()
///     }
///     fn object(&self, id: &str) -> DiResult<Instance> {
///         Err(DiError::NotFound(id.to_string()))
///     }
/// }
///
/// let env = Env(Value::map([("host", Value::from("db")), ("port", Value::from(5432))]));
/// let resolver = ReferenceResolver::default();
///
/// let port = resolver.resolve(&Value::from("${port}"), &env, ResolveMode::All).unwrap();
/// assert_eq!(port, Value::from(5432));
///
/// let url = resolver.resolve(&Value::from("pg://${host}:${port}"), &env, ResolveMode::All).unwrap();
/// assert_eq!(url, Value::from("pg://db:5432"));
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    pattern: ReferencePattern,
    max_depth: usize,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(ReferencePattern::default(), 32)
    }
}

impl ReferenceResolver {
    pub fn new(pattern: ReferencePattern, max_depth: usize) -> Self {
        Self { pattern, max_depth }
    }

    pub fn pattern(&self) -> &ReferencePattern {
        &self.pattern
    }

    /// Resolves every token in `value`, returning the substituted copy.
    pub fn resolve(&self, value: &Value, source: &dyn ReferenceSource, mode: ResolveMode) -> DiResult<Value> {
        self.resolve_at(value, source, mode, 0)
    }

    fn resolve_at(&self, value: &Value, source: &dyn ReferenceSource, mode: ResolveMode, depth: usize) -> DiResult<Value> {
        match value {
            Value::Str(text) if self.pattern.may_contain_token(text) => self.resolve_str(text, source, mode, depth),
            Value::List(items) => items
                .iter()
                .map(|item| self.resolve_at(item, source, mode, depth))
                .collect::<DiResult<Vec<_>>>()
                .map(Value::List),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.resolve_at(v, source, mode, depth)?)))
                .collect::<DiResult<BTreeMap<_, _>>>()
                .map(Value::Map),
            other => Ok(other.clone()),
        }
    }

    fn resolve_str(&self, text: &str, source: &dyn ReferenceSource, mode: ResolveMode, depth: usize) -> DiResult<Value> {
        let segments = self.scan(text);

        if let [Segment::Ref { token, raw }] = segments.as_slice() {
            return Ok(self
                .lookup(*token, source, mode, depth)?
                .unwrap_or_else(|| Value::from(*raw)));
        }

        let mut out = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Ref { token, raw } => match self.lookup(*token, source, mode, depth)? {
                    None => out.push_str(raw),
                    Some(found) => {
                        let scalar = found.scalar_to_string().ok_or_else(|| {
                            DiError::Definition(format!(
                                "cannot interpolate {} reference {raw} into \"{text}\"",
                                found.kind()
                            ))
                        })?;
                        out.push_str(&scalar);
                    }
                },
            }
        }
        Ok(Value::Str(out))
    }

    /// Value for one token, `None` when the mode leaves it in place.
    fn lookup(&self, token: Token<'_>, source: &dyn ReferenceSource, mode: ResolveMode, depth: usize) -> DiResult<Option<Value>> {
        match token {
            Token::Object(_) if mode == ResolveMode::ConfigOnly => Ok(None),
            Token::Object(id) => source.object(id).map(|obj| Some(Value::Object(obj))),
            Token::Config(path) => {
                if depth >= self.max_depth {
                    return Err(DiError::ConfigReference(format!(
                        "{path} (reference depth {} exceeded)",
                        self.max_depth
                    )));
                }
                let raw = source
                    .config_value(path)
                    .ok_or_else(|| DiError::ConfigReference(path.to_string()))?;
                self.resolve_at(&raw, source, mode, depth + 1).map(Some)
            }
        }
    }

    fn scan<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let start = self.pattern.start.as_str();
        let end = self.pattern.end.as_str();
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find(start) {
            let body_from = open + start.len();
            let Some(close) = rest[body_from..].find(end) else {
                break;
            };
            let body = &rest[body_from..body_from + close];
            let token_end = body_from + close + end.len();
            if body.is_empty() {
                segments.push(Segment::Text(&rest[..token_end]));
                rest = &rest[token_end..];
                continue;
            }
            if open > 0 {
                segments.push(Segment::Text(&rest[..open]));
            }
            let token = match body.strip_prefix(self.pattern.object_marker) {
                Some(id) => Token::Object(id),
                None => Token::Config(body),
            };
            segments.push(Segment::Ref { token, raw: &rest[open..token_end] });
            rest = &rest[token_end..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }
        segments
    }
}
