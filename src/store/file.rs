use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use log::warn;
use parking_lot::{Mutex, RwLock};

use super::traits::{apply_batch, Backing, EditBatch, Slot};

/// Backing persisted as one JSON document per store name.
///
/// `commit` rewrites the document through a temp-file rename so a crash
/// mid-write leaves the previous snapshot intact. `apply` updates the
/// in-memory map immediately and snapshots to disk from a background
/// thread, mirroring the commit/apply split of the platform preference
/// stores this layer descends from.
#[derive(Debug)]
pub struct FileBacking {
    path: PathBuf,
    data: Arc<RwLock<BTreeMap<String, Slot>>>,
    writers: Mutex<Vec<JoinHandle<()>>>,
}

impl FileBacking {
    /// Open (or create) the store file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading store file {}", path.display()))?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing store file {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
            writers: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_snapshot(path: &Path, data: &BTreeMap<String, Slot>) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating store directory {}", dir.display()))?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(data)?;
        fs::write(&tmp, text)
            .with_context(|| format!("writing store snapshot {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("replacing store file {}", path.display()))?;
        Ok(())
    }

    /// Block until every queued background write has finished.
    pub fn sync(&self) {
        let handles: Vec<_> = self.writers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Backing for FileBacking {
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
        Self::write_snapshot(&self.path, &data)
    }

    fn apply(&self, batch: EditBatch) {
        {
            let mut data = self.data.write();
            apply_batch(&mut data, &batch);
        }
        let path = self.path.clone();
        let data = Arc::clone(&self.data);
        let handle = std::thread::spawn(move || {
            let snapshot = data.read().clone();
            if let Err(err) = Self::write_snapshot(&path, &snapshot) {
                warn!("background write to {} failed: {err:#}", path.display());
            }
        });
        let mut writers = self.writers.lock();
        writers.retain(|h| !h.is_finished());
        writers.push(handle);
    }
}
