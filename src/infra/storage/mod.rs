// KeyValueStore backends.

pub mod in_memory;
pub mod json_store;

pub use in_memory::InMemoryKeyValueStore;
pub use json_store::JsonKeyValueStore;
