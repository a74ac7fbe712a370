// Adapters layer: concrete implementations of the page and settings-store ports.

pub mod memory_dom;
pub mod settings_store;

pub use memory_dom::{MemoryDom, NodeId};
pub use settings_store::{JsonFileSettingsStore, MemorySettingsStore};
