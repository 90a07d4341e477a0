pub mod kv;
pub mod pool;

pub use kv::{KvError, KvStore, MemoryKv};
pub use pool::create_pool;
