//! An embedded preferences store with nested namespaces.
//!
//! The heart of the crate is [`Settings`], a prefix-based hierarchical
//! view over a flat, durable, string-keyed [`Backing`], with deferred
//! batched writes and JSON diff-and-patch application. Around it sit
//! [`OptionFinder`] (request-document-then-store option resolution),
//! [`MongoPatch`] (a MongoDB-style update accumulator) and [`Tags`]
//! (recursive any/all tag matching).

pub mod config;
pub mod logic;
pub mod model;
pub mod store;

// Export configuration
pub use config::StoreConfig;

// Export logic types
pub use logic::json::{
    decode, encode, find_path, get_idx, get_opt, looks_structured, split_path, try_find_path,
    JsonValue,
};
pub use logic::OptionFinder;

// Export all model types
pub use model::*;

// Export store types
pub use store::{
    Backing, Edit, EditBatch, FileBacking, MemoryBacking, Settings, SettingsBuilder, Slot,
    StoreError,
};
