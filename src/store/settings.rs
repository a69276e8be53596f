use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::logic::json;
use crate::model::{SpecValue, UpdateSpec, NESTED_MARKER};

use super::file::FileBacking;
use super::traits::{Backing, Edit, EditBatch, Slot, StoreError};

pub const DEFAULT_SEPARATOR: &str = ".";

fn slot_bool(slot: &Slot) -> Option<bool> {
    match slot {
        Slot::Bool(b) => Some(*b),
        _ => None,
    }
}

fn slot_int(slot: &Slot) -> Option<i32> {
    match slot {
        Slot::Int(i) => Some(*i),
        Slot::Long(l) => Some(*l as i32),
        _ => None,
    }
}

fn slot_long(slot: &Slot) -> Option<i64> {
    match slot {
        Slot::Long(l) => Some(*l),
        Slot::Int(i) => Some(i64::from(*i)),
        _ => None,
    }
}

fn slot_float(slot: &Slot) -> Option<f32> {
    match slot {
        Slot::Float(f) => Some(*f),
        _ => None,
    }
}

fn slot_double(slot: &Slot) -> Option<f64> {
    match slot {
        Slot::Long(bits) => Some(f64::from_bits(*bits as u64)),
        _ => None,
    }
}

fn slot_string(slot: &Slot) -> Option<String> {
    match slot {
        Slot::Str(s) => Some(s.clone()),
        _ => None,
    }
}

/// A namespaced view over a [`Backing`].
///
/// All views opened from the same root share the backing and the
/// pending-edit buffer: a write staged through a child is flushed by a
/// `save` on any view of the family. Reads always see the committed
/// state, never the pending buffer. Single-writer usage is assumed;
/// the interior locks make sharing sound, they do not make concurrent
/// writers meaningful.
#[derive(Clone)]
pub struct Settings {
    backing: Arc<dyn Backing>,
    store_name: String,
    separator: String,
    prefix: String,
    nested_marker: String,
    edits: Arc<Mutex<EditBatch>>,
    children: Arc<Mutex<HashMap<String, Settings>>>,
}

/// Configures a root [`Settings`] view before opening it.
pub struct SettingsBuilder {
    backing: Arc<dyn Backing>,
    store_name: String,
    separator: String,
    prefix: String,
    nested_marker: String,
}

impl SettingsBuilder {
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn nested_marker(mut self, marker: impl Into<String>) -> Self {
        self.nested_marker = marker.into();
        self
    }

    pub fn build(self) -> Settings {
        Settings {
            backing: self.backing,
            store_name: self.store_name,
            separator: self.separator,
            prefix: self.prefix,
            nested_marker: self.nested_marker,
            edits: Arc::new(Mutex::new(EditBatch::new())),
            children: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Settings {
    pub fn builder(backing: Arc<dyn Backing>, store_name: impl Into<String>) -> SettingsBuilder {
        SettingsBuilder {
            backing,
            store_name: store_name.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
            prefix: String::new(),
            nested_marker: NESTED_MARKER.to_string(),
        }
    }

    /// Open a file-backed root view for `store_name` per the given
    /// configuration.
    pub fn open(config: &StoreConfig, store_name: &str) -> Result<Settings> {
        let backing = Arc::new(FileBacking::open(config.store_path(store_name))?);
        Ok(Self::builder(backing, store_name)
            .separator(&config.separator)
            .nested_marker(&config.nested_marker)
            .build())
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// The cached child view for `key`; constructed on first use with
    /// this view's prefix extended by `key` and the separator.
    pub fn nested(&self, key: &str) -> Settings {
        let mut children = self.children.lock();
        if let Some(child) = children.get(key) {
            return child.clone();
        }
        let child = Settings {
            backing: Arc::clone(&self.backing),
            store_name: self.store_name.clone(),
            separator: self.separator.clone(),
            prefix: format!("{}{}{}", self.prefix, key, self.separator),
            nested_marker: self.nested_marker.clone(),
            edits: Arc::clone(&self.edits),
            children: Arc::new(Mutex::new(HashMap::new())),
        };
        children.insert(key.to_string(), child.clone());
        child
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backing.contains(&self.full_key(key))
    }

    fn backing_slot(&self, key: &str) -> Option<Slot> {
        self.backing.get(&self.full_key(key))
    }

    /// The staged state of a key: `Some(Some)` for a pending put,
    /// `Some(None)` for a pending removal, `None` when untouched.
    fn staged_slot(&self, key: &str) -> Option<Option<Slot>> {
        self.edits
            .lock()
            .get(&self.full_key(key))
            .map(|edit| match edit {
                Edit::Put(slot) => Some(slot.clone()),
                Edit::Remove => None,
            })
    }

    /// The value a key will have once the pending buffer is saved.
    fn effective_slot(&self, key: &str) -> Option<Slot> {
        match self.staged_slot(key) {
            Some(staged) => staged,
            None => self.backing_slot(key),
        }
    }

    fn contains_effective(&self, key: &str) -> bool {
        match self.staged_slot(key) {
            Some(staged) => staged.is_some(),
            None => self.contains(key),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_bool)
            .unwrap_or(default)
    }

    /// Int read; a `Long` slot is narrowed rather than treated as a
    /// mismatch.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_int)
            .unwrap_or(default)
    }

    /// Long read; an `Int` slot widens.
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_long)
            .unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_float)
            .unwrap_or(default)
    }

    /// Doubles live in `Long` slots as raw bits.
    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_double)
            .unwrap_or(default)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.backing_slot(key)
            .as_ref()
            .and_then(slot_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_string_set(&self, key: &str) -> Option<BTreeSet<String>> {
        match self.backing_slot(key) {
            Some(Slot::StrSet(set)) => Some(set),
            _ => None,
        }
    }

    /// Decode the stored string under `key`; missing or empty yields
    /// `default`. Corrupt stored JSON is surfaced, not defaulted.
    pub fn get_value(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        match self.backing_slot(key).as_ref().and_then(slot_string) {
            Some(text) if !text.is_empty() => self.decode_stored(key, &text),
            _ => Ok(default),
        }
    }

    /// The stored object under `key`, or `None` when missing, empty, or
    /// not an object.
    pub fn get_object(&self, key: &str) -> Result<Option<Map<String, Value>>, StoreError> {
        Ok(match self.get_value(key, Value::Null)? {
            Value::Object(map) => Some(map),
            _ => None,
        })
    }

    /// The stored array under `key`, or `None` when missing, empty, or
    /// not an array.
    pub fn get_array(&self, key: &str) -> Result<Option<Vec<Value>>, StoreError> {
        Ok(match self.get_value(key, Value::Null)? {
            Value::Array(list) => Some(list),
            _ => None,
        })
    }

    fn decode_stored(&self, key: &str, text: &str) -> Result<Value, StoreError> {
        json::decode(text).map_err(|source| StoreError::Corrupt {
            key: self.full_key(key),
            source,
        })
    }

    fn stage(&self, key: &str, edit: Edit) -> &Self {
        self.edits.lock().insert(self.full_key(key), edit);
        self
    }

    pub fn put_bool(&self, key: &str, value: bool) -> &Self {
        self.stage(key, Edit::Put(Slot::Bool(value)))
    }

    pub fn put_int(&self, key: &str, value: i32) -> &Self {
        self.stage(key, Edit::Put(Slot::Int(value)))
    }

    pub fn put_long(&self, key: &str, value: i64) -> &Self {
        self.stage(key, Edit::Put(Slot::Long(value)))
    }

    pub fn put_float(&self, key: &str, value: f32) -> &Self {
        self.stage(key, Edit::Put(Slot::Float(value)))
    }

    pub fn put_double(&self, key: &str, value: f64) -> &Self {
        self.stage(key, Edit::Put(Slot::Long(value.to_bits() as i64)))
    }

    pub fn put_string(&self, key: &str, value: impl Into<String>) -> &Self {
        self.stage(key, Edit::Put(Slot::Str(value.into())))
    }

    pub fn put_string_set(&self, key: &str, value: BTreeSet<String>) -> &Self {
        self.stage(key, Edit::Put(Slot::StrSet(value)))
    }

    /// Encode any value through the codec and stage it as a string
    /// write.
    pub fn put_value(&self, key: &str, value: &Value) -> &Self {
        self.put_string(key, json::encode(value))
    }

    pub fn put_object(&self, key: &str, value: Map<String, Value>) -> &Self {
        self.put_value(key, &Value::Object(value))
    }

    pub fn put_array(&self, key: &str, value: Vec<Value>) -> &Self {
        self.put_value(key, &Value::Array(value))
    }

    /// Stage a whole map of values, dispatching each entry to the
    /// matching typed put. Nulls remove their key. Entries with no
    /// storable representation are logged and skipped; the rest of the
    /// batch still goes through.
    pub fn put_all(&self, values: &Map<String, Value>) -> &Self {
        for (key, value) in values {
            match value {
                Value::Null => {
                    self.remove(key);
                }
                Value::Bool(b) => {
                    self.put_bool(key, *b);
                }
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        self.put_long(key, i);
                    } else if let Some(f) = n.as_f64() {
                        self.put_double(key, f);
                    } else {
                        warn!("unsupported number for `{key}`: {n}");
                    }
                }
                Value::String(s) => {
                    self.put_string(key, s.clone());
                }
                Value::Object(_) | Value::Array(_) => {
                    self.put_value(key, value);
                }
            }
        }
        self
    }

    pub fn remove(&self, key: &str) -> &Self {
        self.stage(key, Edit::Remove)
    }

    pub fn remove_keys<I, S>(&self, keys: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.remove(key.as_ref());
        }
        self
    }

    /// Stage a removal of every key visible to this view.
    pub fn clear(&self) -> &Self {
        for key in self.backing.all().keys() {
            if self.prefix.is_empty() {
                self.remove(key);
            } else if let Some(stripped) = key.strip_prefix(&self.prefix) {
                self.remove(stripped);
            }
        }
        self
    }

    /// Whether the shared pending buffer holds any staged edits.
    pub fn is_dirty(&self) -> bool {
        !self.edits.lock().is_empty()
    }

    /// Flush the pending buffer.
    ///
    /// `atomic` commits synchronously and reports the backing's verdict;
    /// on failure the staged edits are put back rather than silently
    /// discarded. Non-atomic hands the batch to the background writer
    /// and reports success immediately. Returns `false` when there was
    /// nothing to save.
    pub fn save(&self, atomic: bool) -> bool {
        let batch = {
            let mut edits = self.edits.lock();
            if edits.is_empty() {
                return false;
            }
            std::mem::take(&mut *edits)
        };
        if atomic {
            match self.backing.commit(&batch) {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        "commit of {} edits to `{}` failed: {err:#}",
                        batch.len(),
                        self.store_name
                    );
                    let mut edits = self.edits.lock();
                    for (key, edit) in batch {
                        edits.entry(key).or_insert(edit);
                    }
                    false
                }
            }
        } else {
            self.backing.apply(batch);
            true
        }
    }

    /// Discard the pending buffer without committing.
    pub fn cancel(&self) {
        self.edits.lock().clear();
    }

    /// Every committed entry under this view's prefix, keys stripped of
    /// the prefix.
    ///
    /// With `expand_nested`, keys that still contain the separator group
    /// under their first segment by recursing through the cached child
    /// view, so each namespace is expanded once. With `expand_json`,
    /// string values that sniff as encoded objects or arrays decode in
    /// place; text that fails to parse stays a plain string.
    pub fn get_all(&self, expand_nested: bool, expand_json: bool) -> Map<String, Value> {
        trace!("get_all[ns={}]", self.prefix);
        let mut out = Map::new();
        for (skey, slot) in self.backing.all() {
            let tkey = if self.prefix.is_empty() {
                skey.as_str()
            } else {
                match skey.strip_prefix(&self.prefix) {
                    Some(stripped) => stripped,
                    None => continue,
                }
            };

            if expand_nested && tkey.contains(&self.separator) {
                let ns = match tkey.split(&self.separator).next() {
                    Some(ns) => ns,
                    None => continue,
                };
                if !out.contains_key(ns) {
                    let nested = self.nested(ns).get_all(expand_nested, expand_json);
                    out.insert(ns.to_string(), Value::Object(nested));
                }
            } else {
                let value = match (&slot, expand_json) {
                    (Slot::Str(text), true) => match json::decode(text) {
                        Ok(value) => value,
                        Err(err) => {
                            debug!("keeping undecodable text under `{tkey}`: {err}");
                            slot.to_json()
                        }
                    },
                    _ => slot.to_json(),
                };
                out.insert(tkey.to_string(), value);
            }
        }
        out
    }

    /// Everything visible to this view as one JSON object, namespaces
    /// and encoded values expanded.
    pub fn to_json(&self) -> Value {
        Value::Object(self.get_all(true, true))
    }

    /// Apply a JSON document of desired assignments; see
    /// [`Settings::update_from_spec`]. Nested objects carrying this
    /// view's marker property recurse as namespace updates.
    pub fn update_from_json(&self, spec: &Map<String, Value>) -> bool {
        self.update_from_spec(&UpdateSpec::from_json_with(spec, &self.nested_marker))
    }

    /// Stage only the entries whose desired value differs from the
    /// effective store state, and report whether anything was staged.
    ///
    /// Comparison reads through the pending buffer, so applying the same
    /// spec twice stages nothing the second time even before a save.
    /// Does not save; persisting the staged diff is the caller's call.
    pub fn update_from_spec(&self, spec: &UpdateSpec) -> bool {
        debug!("update_from_spec[ns={}]", self.prefix);
        let mut updated = false;

        for (key, value) in spec.iter() {
            trace!("updating {key}");
            match value {
                SpecValue::Null => {
                    if self.contains_effective(key) {
                        self.remove(key);
                        updated = true;
                    }
                }
                SpecValue::Bool(want) => {
                    let current = self.effective_slot(key).as_ref().and_then(slot_bool);
                    if current != Some(*want) {
                        self.put_bool(key, *want);
                        updated = true;
                    }
                }
                SpecValue::Int(want) => {
                    let current = self.effective_slot(key).as_ref().and_then(slot_long);
                    if current != Some(*want) {
                        self.put_long(key, *want);
                        updated = true;
                    }
                }
                SpecValue::Float(want) => {
                    let current = self.effective_slot(key).as_ref().and_then(slot_double);
                    if current != Some(*want) {
                        self.put_double(key, *want);
                        updated = true;
                    }
                }
                SpecValue::Str(want) => {
                    let current = self.effective_slot(key).as_ref().and_then(slot_string);
                    if current.as_deref() != Some(want.as_str()) {
                        self.put_string(key, want.clone());
                        updated = true;
                    }
                }
                SpecValue::Namespace(nested_spec) => {
                    trace!("{key} is a nested namespace");
                    if self.nested(key).update_from_spec(nested_spec) {
                        updated = true;
                    }
                }
                SpecValue::Opaque(want) => {
                    let current = self
                        .effective_slot(key)
                        .as_ref()
                        .and_then(slot_string)
                        .and_then(|text| json::decode(&text).ok());
                    if current.as_ref() != Some(want) {
                        self.put_value(key, want);
                        updated = true;
                    }
                }
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBacking;
    use serde_json::json;

    fn memory_settings() -> Settings {
        Settings::builder(Arc::new(MemoryBacking::new()), "test").build()
    }

    #[test]
    fn typed_round_trip_through_save() {
        let settings = memory_settings();
        settings
            .put_bool("flag", true)
            .put_int("small", 7)
            .put_long("big", 1i64 << 40)
            .put_float("ratio", 0.5)
            .put_double("precise", 2.25)
            .put_string("name", "Ann");
        assert!(settings.save(true));

        assert!(settings.get_bool("flag", false));
        assert_eq!(settings.get_int("small", 0), 7);
        assert_eq!(settings.get_long("big", 0), 1i64 << 40);
        assert_eq!(settings.get_float("ratio", 0.0), 0.5);
        assert_eq!(settings.get_double("precise", 0.0), 2.25);
        assert_eq!(settings.get_string("name", ""), "Ann");
    }

    #[test]
    fn type_mismatch_reads_fall_back_with_numeric_widening() {
        let settings = memory_settings();
        settings.put_int("num", 5).put_string("text", "x");
        settings.save(true);

        assert_eq!(settings.get_long("num", 0), 5, "int widens to long");
        assert_eq!(settings.get_int("text", 9), 9, "string is not a number");
        assert!(!settings.get_bool("num", false));

        settings.put_long("wide", 3).save(true);
        assert_eq!(settings.get_int("wide", 0), 3, "long narrows to int");
    }

    #[test]
    fn pending_edits_are_invisible_until_save() {
        let settings = memory_settings();
        settings.put_string("name", "Ann");
        assert_eq!(settings.get_string("name", "none"), "none");
        assert!(settings.is_dirty());

        settings.cancel();
        assert!(!settings.is_dirty());
        assert!(!settings.save(true), "nothing left to save");

        settings.put_string("name", "Ann");
        assert!(settings.save(true));
        assert_eq!(settings.get_string("name", "none"), "Ann");
    }

    #[test]
    fn nested_views_share_prefix_and_buffer() {
        let settings = memory_settings();
        settings.put_string("profile.name", "Ann");
        settings.nested("profile").put_int("age", 30);
        assert!(settings.save(true), "child writes flush with the root save");

        let profile = settings.nested("profile");
        assert_eq!(profile.get_string("name", ""), "Ann");
        assert_eq!(profile.get_int("age", 0), 30);
        assert_eq!(settings.get_string("profile.name", ""), "Ann");
        assert!(profile.contains("name"));
        assert!(!profile.contains("profile.name"));
    }

    #[test]
    fn nested_views_are_cached() {
        let settings = memory_settings();
        let first = settings.nested("ns");
        let second = settings.nested("ns");
        assert!(Arc::ptr_eq(&first.children, &second.children));
    }

    #[test]
    fn structured_values_round_trip() {
        let settings = memory_settings();
        let object = json!({"a": 1, "b": [true, "two"]});
        settings.put_value("doc", &object);
        settings.put_array("list", vec![json!(1), json!(2)]);
        settings.save(true);

        assert_eq!(
            settings.get_object("doc").unwrap(),
            Some(object.as_object().unwrap().clone())
        );
        assert_eq!(
            settings.get_array("list").unwrap(),
            Some(vec![json!(1), json!(2)])
        );
        assert_eq!(settings.get_object("list").unwrap(), None, "array is not an object");
        assert_eq!(settings.get_value("missing", json!("dflt")).unwrap(), json!("dflt"));
    }

    #[test]
    fn corrupt_stored_json_surfaces() {
        let settings = memory_settings();
        settings.put_string("doc", "{broken");
        settings.save(true);
        assert!(matches!(
            settings.get_object("doc"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn put_all_dispatches_on_value_kind() {
        let settings = memory_settings();
        settings.put_string("stale", "x").save(true);

        let doc = json!({
            "flag": true,
            "count": 5,
            "ratio": 1.5,
            "name": "Ann",
            "doc": {"k": "v"},
            "stale": null,
        });
        settings.put_all(doc.as_object().unwrap());
        settings.save(true);

        assert!(settings.get_bool("flag", false));
        assert_eq!(settings.get_long("count", 0), 5);
        assert_eq!(settings.get_double("ratio", 0.0), 1.5);
        assert_eq!(settings.get_string("name", ""), "Ann");
        assert_eq!(
            settings.get_object("doc").unwrap(),
            Some(json!({"k": "v"}).as_object().unwrap().clone())
        );
        assert!(!settings.contains("stale"), "null removes the key");
    }

    #[test]
    fn get_all_expands_namespaces_and_encoded_values() {
        let settings = memory_settings();
        settings
            .put_string("profile.name", "Ann")
            .put_int("profile.age", 30)
            .put_string("doc", r#"{"x":1}"#)
            .put_string("plain", "keep");
        settings.save(true);

        let all = settings.get_all(true, true);
        assert_eq!(
            Value::Object(all),
            json!({
                "profile": {"name": "Ann", "age": 30},
                "doc": {"x": 1},
                "plain": "keep",
            })
        );

        let flat = settings.get_all(false, false);
        assert_eq!(flat.get("profile.name"), Some(&json!("Ann")));
        assert_eq!(flat.get("doc"), Some(&json!(r#"{"x":1}"#)));
    }

    #[test]
    fn clear_only_touches_this_namespace() {
        let settings = memory_settings();
        settings
            .put_string("profile.name", "Ann")
            .put_string("other", "keep");
        settings.save(true);

        settings.nested("profile").clear();
        settings.save(true);

        assert!(!settings.contains("profile.name"));
        assert!(settings.contains("other"));
    }

    #[test]
    fn update_stages_only_differences() {
        let settings = memory_settings();
        settings.put_long("count", 4).put_string("name", "Ann");
        settings.save(true);

        let spec = json!({"count": 5, "name": "Ann", "fresh": true});
        assert!(settings.update_from_json(spec.as_object().unwrap()));
        assert!(settings.is_dirty());
        assert!(settings.save(false));

        assert_eq!(settings.get_long("count", 0), 5);
        assert!(settings.get_bool("fresh", false));

        assert!(
            !settings.update_from_json(spec.as_object().unwrap()),
            "second application is a no-op"
        );
        assert!(!settings.is_dirty());
    }

    #[test]
    fn update_is_idempotent_even_before_save() {
        let settings = memory_settings();
        let spec = json!({"count": 5});
        assert!(settings.update_from_json(spec.as_object().unwrap()));
        assert!(
            !settings.update_from_json(spec.as_object().unwrap()),
            "comparison reads through the pending buffer"
        );
        assert!(settings.save(true));
    }

    #[test]
    fn update_null_removes_and_marker_recurses() {
        let settings = memory_settings();
        settings
            .put_string("gone", "x")
            .put_string("profile.name", "Ann");
        settings.save(true);

        let spec = json!({
            "gone": null,
            "absent": null,
            "profile": {"__": true, "name": "Beth"},
        });
        assert!(settings.update_from_json(spec.as_object().unwrap()));
        settings.save(true);

        assert!(!settings.contains("gone"));
        assert!(!settings.contains("absent"));
        assert_eq!(settings.get_string("profile.name", ""), "Beth");
        assert!(
            !settings.contains(&format!("profile{}__", DEFAULT_SEPARATOR)),
            "marker itself is never written"
        );
    }

    #[test]
    fn update_treats_unmarked_objects_as_opaque() {
        let settings = memory_settings();
        let spec = json!({"doc": {"a": 1}});
        assert!(settings.update_from_json(spec.as_object().unwrap()));
        settings.save(true);

        assert_eq!(
            settings.get_object("doc").unwrap(),
            Some(json!({"a": 1}).as_object().unwrap().clone())
        );
        assert!(
            !settings.update_from_json(spec.as_object().unwrap()),
            "structurally equal document stages nothing"
        );

        let changed = json!({"doc": {"a": 2}});
        assert!(settings.update_from_json(changed.as_object().unwrap()));
    }
}
