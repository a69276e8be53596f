use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use super::traits::{apply_batch, Backing, EditBatch, Slot};

/// Volatile backing for tests and request-scoped stores. Commits apply
/// to the shared map and nothing ever touches disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryBacking {
    data: Arc<RwLock<BTreeMap<String, Slot>>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backing for MemoryBacking {
    fn get(&self, key: &str) -> Option<Slot> {
        self.data.read().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    fn all(&self) -> BTreeMap<String, Slot> {
        self.data.read().clone()
    }

    fn commit(&self, batch: &EditBatch) -> Result<()> {
        let mut data = self.data.write();
        apply_batch(&mut data, batch);
        Ok(())
    }

    fn apply(&self, batch: EditBatch) {
        let _ = self.commit(&batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Edit;

    #[test]
    fn commit_applies_puts_and_removes() {
        let backing = MemoryBacking::new();
        let mut batch = EditBatch::new();
        batch.insert("a".to_string(), Edit::Put(Slot::Int(1)));
        batch.insert("b".to_string(), Edit::Put(Slot::Str("x".to_string())));
        backing.commit(&batch).unwrap();

        assert_eq!(backing.get("a"), Some(Slot::Int(1)));
        assert!(backing.contains("b"));

        let mut batch = EditBatch::new();
        batch.insert("a".to_string(), Edit::Remove);
        backing.commit(&batch).unwrap();
        assert_eq!(backing.get("a"), None);
        assert_eq!(backing.all().len(), 1);
    }
}
