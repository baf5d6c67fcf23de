//! Core traits for the object graph builder.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
