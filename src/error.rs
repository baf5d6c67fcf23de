//! Error types for the object graph builder.

use thiserror::Error;

/// Boxed error returned by user constructors, factories and hook methods.
///
/// Anything implementing `std::error::Error` converts into it with `?`, and so
/// do plain `String`/`&str` messages.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dependency injection errors
///
/// Represents the conditions that can occur while resolving references,
/// autowiring parameters or constructing objects in ferrous-wire.
///
/// Only [`DiError::UnresolvedType`] and [`DiError::Circular`] are recovered
/// from internally, and only by the startup resolution queue; everything else
/// propagates straight to the caller of `get`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Config, Container, DiError, ResolverCore};
///
/// let container = Container::builder(Config::empty()).build().unwrap();
/// match container.resolve_id("missing") {
///     Err(DiError::NotFound(id)) => assert_eq!(id, "missing"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Error)]
pub enum DiError {
    /// No definition, bootstrap object or indexed type matches the identifier
    #[error("Service {0} not found")]
    NotFound(String),
    /// A required class-typed parameter could not be satisfied yet
    #[error("Unresolved type: {0}")]
    UnresolvedType(String),
    /// Constructor, factory or hook failed, or the target type is unknown
    #[error("Construction failed: {0}")]
    Construction(String),
    /// Malformed service definition or hook specification
    #[error("Bad definition: {0}")]
    Definition(String),
    /// A reference token names a configuration path that does not exist
    #[error("Unknown configuration reference: {0}")]
    ConfigReference(String),
    /// Startup resolution gave up on an identifier
    #[error("Configuration error for service {id}: {source}")]
    Configuration {
        /// First identifier that never converged
        id: String,
        /// Last error observed for it
        #[source]
        source: Box<DiError>,
    },
    /// Re-entrant resolution of an identifier already being built
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Downcast of a resolved object to the requested Rust type failed
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Requested type
        expected: String,
        /// Concrete type of the object
        found: String,
    },
    /// The process-wide container was initialized twice
    #[error("Container already initialized")]
    AlreadyInitialized,
    /// The process-wide container is not initialized
    #[error("Container not initialized")]
    NotInitialized,
    /// Configuration text could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl DiError {
    /// Whether the startup resolution queue may retry after this error.
    pub fn is_deferrable(&self) -> bool {
        matches!(self, DiError::UnresolvedType(_) | DiError::Circular(_))
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
