use std::collections::HashMap;
use std::sync::RwLock;

/// String key/value storage that lives exactly as long as one client tab.
///
/// Nothing written here may outlive the process that owns it.
pub trait TabStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Drop every key. Called when the tab is torn down.
    fn clear(&self);
}

/// In-process tab storage.
#[derive(Debug, Default)]
pub struct MemoryTabStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TabStorage for MemoryTabStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryTabStorage::new();
        assert!(storage.get("k").is_none());

        storage.set("k", "v".to_string());
        assert_eq!(storage.get("k").as_deref(), Some("v"));

        storage.remove("k");
        assert!(storage.get("k").is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_drops_everything() {
        let storage = MemoryTabStorage::new();
        storage.set("a", "1".to_string());
        storage.set("b", "2".to_string());
        assert_eq!(storage.len(), 2);

        storage.clear();
        assert!(storage.is_empty());
    }
}
