use crate::domain::model::{StorageArea, StorageChangeEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::broadcast;

/// Callback invoked with the number of structural mutation records in a batch.
pub type MutationCallback = Box<dyn Fn(usize) + Send + 'static>;

/// Key-value settings store with change notifications.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(
        &self,
        area: StorageArea,
        keys: &[&str],
    ) -> Result<HashMap<String, serde_json::Value>>;

    async fn set(&self, area: StorageArea, values: HashMap<String, serde_json::Value>)
        -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChangeEvent>;
}

/// The page tree the replacer reads from and writes to.
///
/// Queries only see nodes attached to the document; structural mutations
/// (text and child list changes) are reported to the registered observer,
/// attribute and visibility changes are not.
pub trait PriceDom: Send {
    type Node: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    /// Attached elements carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Node>;

    /// Attached elements carrying `class` below the element with id `scope_id`.
    fn elements_by_class_in_scope(&self, scope_id: &str, class: &str) -> Vec<Self::Node>;

    /// First descendant of `root` carrying `class`.
    fn find_in(&self, root: Self::Node, class: &str) -> Option<Self::Node>;

    fn has_ancestor_with_class(&self, node: Self::Node, class: &str) -> bool;

    fn text_content(&self, node: Self::Node) -> String;

    /// Replaces all children of `node` with a single text node.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    fn set_hidden(&mut self, node: Self::Node, hidden: bool);

    /// Registers the structural-mutation observer, replacing any previous one.
    fn observe(&mut self, callback: MutationCallback);
}
