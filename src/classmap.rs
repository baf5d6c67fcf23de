//! Type index: concrete type name → most recently stored shared instance.

use crate::instance::Instance;
use crate::registration::TypeRegistry;

/// Secondary index of shared objects by concrete type.
///
/// Storing an object of type `T` replaces any earlier `T` entry
/// (last-write-wins) while keeping the entry's original position. A lookup by
/// a supertype or interface name scans the entries in insertion order and
/// returns the first assignable one. When several indexed types implement
/// the same interface, which one is returned is unspecified and callers must
/// not depend on it.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ClassMap, Instance, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct FileLog;
///
/// let mut types = TypeRegistry::new();
/// types.register(TypeDescriptor::interface("Log"));
/// types.register(TypeDescriptor::of::<FileLog>().alias("FileLog").implements("Log"));
///
/// let mut map = ClassMap::default();
/// let log = Instance::new(FileLog);
/// map.store(&types, log.clone());
///
/// assert!(map.get(&types, "Log").unwrap().ptr_eq(&log));
/// assert!(map.get(&types, "FileLog").unwrap().ptr_eq(&log));
/// assert!(map.get(&types, "Other").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ClassMap {
    entries: Vec<(String, Instance)>,
}

impl ClassMap {
    /// Indexes `instance` under its concrete type name.
    pub fn store(&mut self, types: &TypeRegistry, instance: Instance) {
        let name = types.type_name_of(&instance);
        if let Some(pos) = self.entries.iter().position(|(n, _)| *n == name) {
            self.entries[pos].1 = instance;
        } else {
            self.entries.push((name, instance));
        }
    }

    /// Indexed concrete type name satisfying `type_name`: exact match first,
    /// then the first assignable entry.
    pub fn find(&self, types: &TypeRegistry, type_name: &str) -> Option<&str> {
        let wanted = types.canonical(type_name).unwrap_or(type_name);
        if let Some((name, _)) = self.entries.iter().find(|(n, _)| n == wanted) {
            return Some(name);
        }
        self.entries
            .iter()
            .find(|(n, _)| types.is_a(n, wanted))
            .map(|(n, _)| n.as_str())
    }

    pub fn get(&self, types: &TypeRegistry, type_name: &str) -> Option<Instance> {
        let name = self.find(types, type_name)?;
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, obj)| obj.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed type names in insertion order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::TypeDescriptor;

    #[derive(Default)]
    struct Parent;
    #[derive(Default)]
    struct Child;

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types
            .register(TypeDescriptor::of::<Parent>().alias("Parent"))
            .register(TypeDescriptor::of::<Child>().alias("Child").implements("Parent"));
        types
    }

    #[test]
    fn last_write_wins_per_type() {
        let types = types();
        let mut map = ClassMap::default();
        let first = Instance::new(Child);
        let second = Instance::new(Child);
        map.store(&types, first);
        map.store(&types, second.clone());
        assert_eq!(map.len(), 1);
        assert!(map.get(&types, "Child").unwrap().ptr_eq(&second));
    }

    #[test]
    fn exact_match_beats_subtype() {
        let types = types();
        let mut map = ClassMap::default();
        let child = Instance::new(Child);
        let parent = Instance::new(Parent);
        map.store(&types, child.clone());
        map.store(&types, parent.clone());
        assert!(map.get(&types, "Parent").unwrap().ptr_eq(&parent));
        assert!(map.get(&types, "Child").unwrap().ptr_eq(&child));
    }

    #[test]
    fn supertype_lookup_finds_subtype() {
        let types = types();
        let mut map = ClassMap::default();
        let child = Instance::new(Child);
        map.store(&types, child.clone());
        assert_eq!(map.find(&types, "Parent"), Some(std::any::type_name::<Child>()));
        assert!(map.get(&types, "Parent").unwrap().ptr_eq(&child));
    }

    #[test]
    fn clear_empties_index() {
        let types = types();
        let mut map = ClassMap::default();
        map.store(&types, Instance::new(Parent));
        map.clear();
        assert!(map.is_empty());
        assert!(map.get(&types, "Parent").is_none());
    }
}
