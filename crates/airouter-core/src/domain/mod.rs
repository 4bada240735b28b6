//! Domain types for backend discovery.

mod backend;
mod registry;

pub use backend::{BackendAddress, BackendModels, ModelEntry};
pub use registry::{ModelRegistry, RegistrySnapshot};
