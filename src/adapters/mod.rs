pub mod cache;
pub mod store;

pub use cache::DismissalCache;
pub use store::{FileStore, KvStore, MemoryStore, StoreError};
