//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{ResolutionStack, StackGuard};

#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
