//! Key-value storage backends.

mod atomic_file;
mod file_store;
mod memory_store;

pub use atomic_file::AtomicFile;
pub use file_store::{encode_key, FileKeyValueStore};
pub use memory_store::MemoryKeyValueStore;
