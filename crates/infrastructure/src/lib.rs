//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_policy_loader;
mod in_memory_access_store;
mod site_snapshot;

pub use access_policy_loader::{load_access_policy, write_access_policy};
pub use in_memory_access_store::InMemoryAccessStore;
pub use site_snapshot::{SiteSnapshot, read_site_snapshot, write_site_snapshot};
