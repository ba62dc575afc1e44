pub mod cache;
pub mod memory;
pub mod seed;
pub mod traits;

pub use cache::{CacheError, CacheInvalidator, QueryCache};
pub use memory::MemoryStore;
pub use traits::*;
