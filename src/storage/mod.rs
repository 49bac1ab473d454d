pub mod slot;
pub mod store;

pub use slot::{PERMISSIONS_DOMAIN, StorageSlot};
pub use store::{StateStore, StoreError, StoreResult};
