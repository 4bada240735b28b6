//! Core services built on the domain types and ports.

mod resolver;

pub use resolver::{MatchKind, ModelResolver, ResolveError, Resolved};
