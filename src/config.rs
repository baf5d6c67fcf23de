//! Hierarchical configuration store.
//!
//! The container reads service definitions, common hooks and its own options
//! from a tree of [`Value`]s addressed by dotted paths (`di.service.cache`).
//! [`Config`] is the in-memory implementation; anything else can plug in
//! through [`ConfigStore`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Narrow contract the container needs from a configuration store.
pub trait ConfigStore: Send + Sync {
    /// Value at a dotted path.
    fn get(&self, path: &str) -> Option<Value>;

    /// Whether a non-null value exists at `path`.
    fn has(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    /// Snapshot of the whole tree.
    fn tree(&self) -> Value;

    /// Replaces the whole tree.
    fn replace_tree(&self, tree: Value);

    /// Sets the value at a dotted path, creating intermediate maps.
    fn add(&self, path: &str, value: Value);
}

/// In-memory configuration tree.
///
/// Keys containing dots are expanded on construction, so
/// `{"name.a": "A"}` and `{"name": {"a": "A"}}` describe the same tree.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Config, ConfigStore, Value};
///
/// let config = Config::from_json_str(r#"{"di.service": {"cache": "Cache"}, "ttl": 60}"#).unwrap();
/// assert_eq!(config.get("di.service.cache"), Some(Value::from("Cache")));
/// assert_eq!(config.get_i64_or("ttl", 0), 60);
/// assert!(!config.has("di.common"));
///
/// config.add("di.common", Value::list([]));
/// assert!(config.has("di.common"));
/// ```
#[derive(Debug, Default)]
pub struct Config {
    tree: RwLock<Value>,
}

impl Config {
    pub fn new(tree: Value) -> Self {
        Self { tree: RwLock::new(tree.expand_dotted()) }
    }

    pub fn empty() -> Self {
        Self::new(Value::map(Vec::<(String, Value)>::new()))
    }

    pub fn from_json(json: serde_json::Value) -> Self {
        Self::new(Value::from(json))
    }

    pub fn from_json_str(text: &str) -> DiResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text).map_err(|e| DiError::Parse(e.to_string()))?;
        Ok(Self::from_json(json))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> DiResult<Self> {
        let json: serde_json::Value = serde_yaml::from_str(text).map_err(|e| DiError::Parse(e.to_string()))?;
        Ok(Self::from_json(json))
    }

    /// String value with a default.
    pub fn get_string_or(&self, path: &str, default: &str) -> String {
        self.tree
            .read()
            .get_path(path)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Integer value with a default.
    pub fn get_i64_or(&self, path: &str, default: i64) -> i64 {
        self.tree.read().get_path(path).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Boolean value with a default.
    pub fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.tree.read().get_path(path).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Keys of the map at `path`, in order; empty when absent or not a map.
    pub fn keys(&self, path: &str) -> Vec<String> {
        self.tree
            .read()
            .get_path(path)
            .and_then(Value::as_map)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ConfigStore for Config {
    fn get(&self, path: &str) -> Option<Value> {
        self.tree.read().get_path(path).cloned()
    }

    fn tree(&self) -> Value {
        self.tree.read().clone()
    }

    fn replace_tree(&self, tree: Value) {
        *self.tree.write() = tree;
    }

    fn add(&self, path: &str, value: Value) {
        self.tree.write().insert_path(path, value);
    }
}

/// Container behavior switches.
///
/// Loaded from `di.options.*` in the configuration, falling back to the
/// defaults below, and overridable through `ContainerBuilder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Where service definitions live
    pub service_path: String,
    /// Where hooks applied to every new object live
    pub common_path: String,
    /// Construct every declared service at startup
    pub auto_resolve: bool,
    /// Construct unindexed class-typed dependencies on demand
    pub autoload: bool,
    /// Startup attempts allowed per declared service
    pub retry_factor: usize,
    /// Also clear the type index on `reload`
    pub reset_classmap_on_reload: bool,
    /// Nesting limit for configuration references
    pub max_reference_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            service_path: "di.service".to_string(),
            common_path: "di.common".to_string(),
            auto_resolve: true,
            autoload: false,
            retry_factor: 3,
            reset_classmap_on_reload: false,
            max_reference_depth: 32,
        }
    }
}

impl ContainerOptions {
    /// Options section path.
    pub const PATH: &'static str = "di.options";

    /// Load options from a configuration store
    pub fn load(config: &Config) -> Self {
        let d = Self::default();
        let key = |name: &str| format!("{}.{name}", Self::PATH);
        Self {
            service_path: config.get_string_or(&key("service_path"), &d.service_path),
            common_path: config.get_string_or(&key("common_path"), &d.common_path),
            auto_resolve: config.get_bool_or(&key("auto_resolve"), d.auto_resolve),
            autoload: config.get_bool_or(&key("autoload"), d.autoload),
            retry_factor: config.get_i64_or(&key("retry_factor"), d.retry_factor as i64).max(1) as usize,
            reset_classmap_on_reload: config.get_bool_or(&key("reset_classmap_on_reload"), d.reset_classmap_on_reload),
            max_reference_depth: config
                .get_i64_or(&key("max_reference_depth"), d.max_reference_depth as i64)
                .max(1) as usize,
        }
    }

    /// Path of one service definition.
    pub fn service(&self, raw_id: &str) -> String {
        format!("{}.{raw_id}", self.service_path)
    }
}
