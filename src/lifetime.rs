//! Object lifetime definitions.

/// Object lifetimes controlling instance caching behavior
///
/// The lifetime of a lookup is decided by the identifier suffix rather than
/// by registration: the same service definition can be fetched shared,
/// per named scope, or fresh.
///
/// # Lifetime Characteristics
///
/// - **Shared**: `name`, cached in the default scope and recorded in the type index
/// - **Scoped**: `name@TAG`, cached once per tag, never recorded in the type index
/// - **Transient**: `name@`, built on every lookup, never cached
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Identifier, Lifetime};
///
/// assert_eq!(*Identifier::parse("cache").lifetime(), Lifetime::Shared);
/// assert_eq!(*Identifier::parse("cache@").lifetime(), Lifetime::Transient);
/// assert_eq!(
///     *Identifier::parse("cache@SESSION").lifetime(),
///     Lifetime::Scoped("SESSION".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance per container, shared by every bare lookup
    ///
    /// Shared objects are also stored in the type index, so constructor
    /// parameters typed with their class (or one of its interfaces) can be
    /// autowired to them.
    Shared,
    /// One instance per scope tag
    ///
    /// `cache@A` and `cache@B` are distinct objects; two `cache@A` lookups
    /// return the same one. Scoped objects stay out of the type index.
    Scoped(String),
    /// New instance per lookup, never cached
    Transient,
}

impl Lifetime {
    /// Scope tag used as the cache partition; `None` for transient lookups.
    pub fn scope_tag(&self) -> Option<&str> {
        match self {
            Lifetime::Shared => Some(""),
            Lifetime::Scoped(tag) => Some(tag),
            Lifetime::Transient => None,
        }
    }
}
