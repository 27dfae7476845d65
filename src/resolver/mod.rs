//! File record resolution
//!
//! Cache-first lookup of assembled file records, falling back to a paged
//! search of the upstream listing plus detail and segment fetches.

pub mod errors;
#[allow(clippy::module_inception)]
pub mod resolver;

#[cfg(test)]
pub mod fakes;

pub use errors::ResolveError;
pub use resolver::{PagingErrorPolicy, Resolver, ResolverConfig, DEFAULT_PAGE_SIZE};
