pub mod seed;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SharedStorage};
pub use store::{create_shared_store, SharedStore, Store, DEFAULT_NAMESPACE};
