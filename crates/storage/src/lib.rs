pub mod conformance;
mod error;
mod file;
pub mod keys;
mod memory;
mod traits;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
