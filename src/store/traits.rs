use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A primitive value as held in one backing slot.
///
/// The backing has no native double; doubles are stored as `Long` raw
/// bits by the settings layer. Structured values are stored as `Str`
/// holding their canonical JSON encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Slot {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Str(String),
    StrSet(BTreeSet<String>),
}

impl Slot {
    /// The JSON counterpart of this slot, used by bulk enumeration.
    pub fn to_json(&self) -> Value {
        match self {
            Slot::Bool(b) => Value::Bool(*b),
            Slot::Int(i) => Value::from(*i),
            Slot::Long(l) => Value::from(*l),
            Slot::Float(f) => Value::from(*f),
            Slot::Str(s) => Value::String(s.clone()),
            Slot::StrSet(set) => {
                Value::Array(set.iter().map(|s| Value::String(s.clone())).collect())
            }
        }
    }
}

/// A staged mutation for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Put(Slot),
    Remove,
}

/// Pending writes keyed by fully-qualified key. Last write per key wins.
pub type EditBatch = BTreeMap<String, Edit>;

/// Apply a batch of edits to a slot map, in key order.
pub(crate) fn apply_batch(data: &mut BTreeMap<String, Slot>, batch: &EditBatch) {
    for (key, edit) in batch {
        match edit {
            Edit::Put(slot) => {
                data.insert(key.clone(), slot.clone());
            }
            Edit::Remove => {
                data.remove(key);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored value for `{key}` is not valid JSON")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string-keyed key-value backend consumed by the settings
/// layer. The settings layer never talks to durable storage directly.
pub trait Backing: Send + Sync {
    fn get(&self, key: &str) -> Option<Slot>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Snapshot of every entry in the store.
    fn all(&self) -> BTreeMap<String, Slot>;

    /// Synchronous durable commit; blocks until the backend confirms.
    fn commit(&self, batch: &EditBatch) -> Result<()>;

    /// Best-effort asynchronous commit: the in-memory view updates
    /// immediately, durability is handed to a background writer, and
    /// failure is never reported to the caller.
    fn apply(&self, batch: EditBatch);
}
