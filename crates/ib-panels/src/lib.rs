//! Panel registry resolution and the storage adapter trait.

pub mod datastore;
pub mod registry;

pub use datastore::{ChatData, DataStore, InMemoryDataStore};
pub use registry::list_enabled;
