//! Key-value backends for client preferences.
//!
//! - [`MemoryKeyValueStore`]: process memory, lost on exit
//! - [`FileKeyValueStore`]: one JSON document on disk, replaced atomically
//! - [`UnavailableKeyValueStore`]: no storage at all (headless jobs)

mod file;
mod memory;
mod unavailable;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use unavailable::UnavailableKeyValueStore;
