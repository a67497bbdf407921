//! Search backend abstraction

pub mod memory;
pub mod traits;

pub use memory::MemorySearchBackend;
pub use traits::{BackendQuery, SearchBackend};
