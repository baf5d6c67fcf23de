//! Process-wide container registry.
//!
//! Some applications want one container reachable from anywhere without
//! threading it through every call. This module holds at most one such
//! container, installed explicitly with [`init`] and removed with
//! [`teardown`]. Extra objects can be published under fixed ids with
//! [`set_alias`]; they take precedence over the container's own services.
//!
//! # Examples
//!
//! ```rust
//! use ferrous_wire::{global, Config, Container};
//!
//! let container = Container::builder(Config::empty()).build().unwrap();
//! global::init(container).unwrap();
//!
//! assert!(global::get("config").is_ok());
//! assert!(matches!(
//!     global::init(Container::builder(Config::empty()).build().unwrap()),
//!     Err(ferrous_wire::DiError::AlreadyInitialized)
//! ));
//!
//! global::teardown();
//! assert!(global::container().is_err());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::provider::Container;

#[derive(Default)]
struct Registry {
    container: Option<Arc<Container>>,
    aliases: HashMap<String, Instance>,
}

static GLOBAL: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

/// Installs the process-wide container.
///
/// # Errors
///
/// `AlreadyInitialized` when a container is installed already.
pub fn init(container: Arc<Container>) -> DiResult<()> {
    let mut global = GLOBAL.write();
    if global.container.is_some() {
        return Err(DiError::AlreadyInitialized);
    }
    global.container = Some(container);
    debug!("global container installed");
    Ok(())
}

/// The process-wide container.
pub fn container() -> DiResult<Arc<Container>> {
    GLOBAL.read().container.clone().ok_or(DiError::NotInitialized)
}

pub fn is_initialized() -> bool {
    GLOBAL.read().container.is_some()
}

/// Looks up an alias, then the process-wide container.
pub fn get(id: &str) -> DiResult<Instance> {
    let container = {
        let global = GLOBAL.read();
        if let Some(obj) = global.aliases.get(id) {
            return Ok(obj.clone());
        }
        global.container.clone().ok_or(DiError::NotInitialized)?
    };
    // lock released: construction may re-enter the registry
    container.get(id)
}

/// Publishes `instance` under `id`.
///
/// # Errors
///
/// `Definition` when `id` is already taken.
pub fn set_alias(id: impl Into<String>, instance: Instance) -> DiResult<()> {
    let id = id.into();
    let mut global = GLOBAL.write();
    if global.aliases.contains_key(&id) {
        return Err(DiError::Definition(format!("alias {id} already set")));
    }
    global.aliases.insert(id, instance);
    Ok(())
}

/// Removes the container and every alias.
pub fn teardown() {
    let mut global = GLOBAL.write();
    global.container = None;
    global.aliases.clear();
    debug!("global container removed");
}
