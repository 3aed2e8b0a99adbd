//! Storage implementations for metadata rows

pub mod in_memory;

pub use in_memory::InMemoryStore;
