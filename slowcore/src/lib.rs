//! slowcore: shared library for slow computer applications

pub mod storage;

pub use storage::{JsonDir, MemoryStore, SliceStore, StorageError};
