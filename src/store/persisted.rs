//! Ordered in-memory collection mirrored to one durable key.
//!
//! Full-snapshot model: every mutation serializes the whole collection back
//! under the same key. An empty collection deletes the key instead of
//! writing an empty serialization.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::KvStore;

/// Fixed key for the chat message collection.
pub const CHAT_MESSAGES_KEY: &str = "chatMessages";
/// Fixed key for the upload record collection.
pub const UPLOADED_FILES_KEY: &str = "uploadedFiles";

pub struct PersistedList<T> {
    store: Arc<dyn KvStore>,
    key: &'static str,
    items: Vec<T>,
}

impl<T: Serialize + DeserializeOwned> PersistedList<T> {
    /// Restores the collection saved under `key`, or starts empty. Never
    /// fails: an unreadable or corrupt snapshot is logged and discarded.
    pub fn load(store: Arc<dyn KvStore>, key: &'static str) -> Self {
        let items = match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("discarding corrupt snapshot under {key:?}: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read snapshot under {key:?}: {e}");
                Vec::new()
            }
        };
        Self { store, key, items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.save();
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.save();
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.save();
    }

    /// Arbitrary in-place mutation followed by a snapshot write.
    pub fn mutate(&mut self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.items);
        self.save();
    }

    fn save(&self) {
        if self.items.is_empty() {
            if let Err(e) = self.store.delete(self.key) {
                log::warn!("failed to delete snapshot key {:?}: {e}", self.key);
            }
            return;
        }
        match serde_json::to_string(&self.items) {
            Ok(raw) => {
                if let Err(e) = self.store.set(self.key, &raw) {
                    log::warn!("failed to write snapshot under {:?}: {e}", self.key);
                }
            }
            Err(e) => log::warn!("failed to serialize snapshot for {:?}: {e}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, UploadRecord};
    use crate::store::MemoryStore;

    fn shared() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_round_trip_restores_items_in_order() {
        let store = shared();
        {
            let mut list: PersistedList<ChatMessage> =
                PersistedList::load(store.clone(), CHAT_MESSAGES_KEY);
            list.push(ChatMessage::user("hello"));
            list.push(ChatMessage::assistant("hi there", vec![]));
        }
        let restored: PersistedList<ChatMessage> =
            PersistedList::load(store, CHAT_MESSAGES_KEY);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.items()[0].content, "hello");
        assert_eq!(restored.items()[1].content, "hi there");
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_empty() {
        let store = shared();
        store.insert_raw(CHAT_MESSAGES_KEY, "{not json");
        let list: PersistedList<ChatMessage> =
            PersistedList::load(store, CHAT_MESSAGES_KEY);
        assert!(list.is_empty());
    }

    #[test]
    fn test_empty_collection_deletes_key() {
        let store = shared();
        let mut list: PersistedList<ChatMessage> =
            PersistedList::load(store.clone(), CHAT_MESSAGES_KEY);
        list.push(ChatMessage::user("only"));
        assert!(store.raw(CHAT_MESSAGES_KEY).is_some());
        list.clear();
        assert!(store.raw(CHAT_MESSAGES_KEY).is_none());
    }

    #[test]
    fn test_every_mutation_rewrites_full_snapshot() {
        let store = shared();
        let mut list: PersistedList<UploadRecord> =
            PersistedList::load(store.clone(), UPLOADED_FILES_KEY);
        list.push(UploadRecord::pending("a.pdf", 10, 1));
        list.push(UploadRecord::pending("b.pdf", 20, 2));
        list.mutate(|items| items[0].uploading = false);

        let raw = store.raw(UPLOADED_FILES_KEY).unwrap();
        let parsed: Vec<UploadRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!parsed[0].uploading);
        assert!(parsed[1].uploading);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let store = shared();
        let mut list: PersistedList<UploadRecord> =
            PersistedList::load(store, UPLOADED_FILES_KEY);
        assert!(list.remove(0).is_none());
    }
}
