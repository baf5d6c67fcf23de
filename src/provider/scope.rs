//! Object pool partitioned by scope tag.

use crate::instance::Instance;
use crate::internal::FastMap;
use crate::key::ScopeKey;

/// Cache of constructed objects, keyed by raw id and scope tag.
///
/// The default scope uses the empty tag, so `cache` and `cache@SESSION` are
/// distinct entries. Transient lookups never reach the pool.
#[derive(Debug, Default)]
pub struct ObjectPool {
    objects: FastMap<ScopeKey, Instance>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ScopeKey) -> Option<&Instance> {
        self.objects.get(key)
    }

    pub fn contains(&self, key: &ScopeKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn insert(&mut self, key: ScopeKey, instance: Instance) {
        self.objects.insert(key, instance);
    }

    /// Drops every cached object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Distinct scope tags currently holding objects, sorted.
    pub fn scopes(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.objects.keys().map(|k| k.scope.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }
}
