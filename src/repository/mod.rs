//! Repository Layer
//!
//! Persistence abstractions and key-value area implementations.

mod memory;
mod storage_manager;
mod traits;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod chrome;

#[cfg(test)]
mod tests;

pub use memory::MemoryArea;
pub use storage_manager::StorageManager;
pub use traits::{KeyValueArea, OutlineRepository};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileArea;

#[cfg(target_arch = "wasm32")]
pub use chrome::ChromeStorageArea;
