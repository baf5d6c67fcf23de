//! Service identifiers and object pool keys.

use std::fmt;
use std::str::FromStr;

use crate::lifetime::Lifetime;

/// Scope separator inside identifiers.
pub const SCOPE_SEPARATOR: char = '@';

/// A parsed service identifier: `name`, `name@` or `name@TAG`.
///
/// Parsing splits on the first `@`, so the raw id never contains one while
/// the scope tag may.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Identifier, Lifetime};
///
/// let id = Identifier::parse("cache@SESSION");
/// assert_eq!(id.raw(), "cache");
/// assert_eq!(id.lifetime(), &Lifetime::Scoped("SESSION".into()));
/// assert_eq!(id.to_string(), "cache@SESSION");
///
/// let fresh: Identifier = "cache@".parse().unwrap();
/// assert!(fresh.scope_key().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    raw: String,
    lifetime: Lifetime,
}

impl Identifier {
    pub fn parse(id: &str) -> Self {
        match id.split_once(SCOPE_SEPARATOR) {
            None => Self { raw: id.to_string(), lifetime: Lifetime::Shared },
            Some((raw, "")) => Self { raw: raw.to_string(), lifetime: Lifetime::Transient },
            Some((raw, tag)) => Self {
                raw: raw.to_string(),
                lifetime: Lifetime::Scoped(tag.to_string()),
            },
        }
    }

    /// Identifier with any scope suffix stripped.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// Whether this lookup belongs to the default (shared) scope.
    pub fn is_default_scope(&self) -> bool {
        self.lifetime == Lifetime::Shared
    }

    /// Object pool key; `None` for transient lookups, which are never stored.
    pub fn scope_key(&self) -> Option<ScopeKey> {
        self.lifetime.scope_tag().map(|tag| ScopeKey {
            raw: self.raw.clone(),
            scope: tag.to_string(),
        })
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identifier::parse(s))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lifetime {
            Lifetime::Shared => f.write_str(&self.raw),
            Lifetime::Transient => write!(f, "{}{}", self.raw, SCOPE_SEPARATOR),
            Lifetime::Scoped(tag) => write!(f, "{}{}{}", self.raw, SCOPE_SEPARATOR, tag),
        }
    }
}

/// Key of the object pool: raw id plus scope tag (`""` for the default scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub raw: String,
    pub scope: String,
}

impl ScopeKey {
    /// Key of the default scope.
    pub fn shared(raw: impl Into<String>) -> Self {
        Self { raw: raw.into(), scope: String::new() }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            f.write_str(&self.raw)
        } else {
            write!(f, "{}{}{}", self.raw, SCOPE_SEPARATOR, self.scope)
        }
    }
}
