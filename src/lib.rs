//! MilanOutline Core
//!
//! Data model, tree engine and persistence for the MilanOutline browser
//! extension. Outlines are forests of titled nodes kept in a single
//! [`store::OutlineStore`] and saved to a key-value storage area.
//!
//! In the browser the crate is loaded as a wasm module and driven through
//! the exported `OutlineApp` handle; natively the same store runs over a
//! JSON file or an in-memory area.

pub mod config;
pub mod domain;
pub mod events;
pub mod extract;
pub mod repository;
pub mod store;
pub mod transfer;
pub mod tree;

#[cfg(target_arch = "wasm32")]
mod bindings;

pub use config::StoreConfig;
pub use domain::{
    DomainError, DomainResult, NodeId, NodePatch, Outline, OutlineId, OutlineNode, OutlinePatch,
};
pub use events::{EventSink, StoreEvent, TracingSink};
pub use extract::ExtractedItem;
pub use outline_logger::{init_logger, LoggerConfig};
pub use store::{AppState, OutlineStore};
