use serde_json::{Map, Value};

use crate::logic::json::{self, JsonValue};
use crate::store::Settings;

/// Resolves a named option from a request-scoped document, falling back
/// to a settings store, falling back to the caller's default.
///
/// The document wins whenever it carries the key directly; with nesting
/// enabled a dotted or slash-separated key is then tried as a path into
/// the document, and only a value whose runtime kind matches the request
/// counts as found there. The settings store is consulted last, and only
/// when it actually contains the key.
#[derive(Clone)]
pub struct OptionFinder {
    settings: Option<Settings>,
    options: Option<Value>,
    default_nesting: bool,
}

impl OptionFinder {
    pub fn new(settings: Option<Settings>, options: Option<Map<String, Value>>) -> Self {
        Self {
            settings,
            options: options.map(Value::Object),
            default_nesting: true,
        }
    }

    /// Disable (or re-enable) the nested path lookup fallback.
    pub fn with_nesting(mut self, nested: bool) -> Self {
        self.default_nesting = nested;
        self
    }

    pub fn options(&self) -> Option<&Map<String, Value>> {
        self.options.as_ref().and_then(Value::as_object)
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Steps 1 and 2 of the chain: the direct property, then the nested
    /// path. A direct property that does not coerce still resolves (to
    /// the default); an explicitly named option shadows the store even
    /// when its value is unusable.
    fn from_options<T: JsonValue + Clone>(&self, key: &str, default: &T) -> Option<T> {
        let options = self.options.as_ref()?;
        let map = options.as_object()?;
        if let Some(value) = map.get(key) {
            return Some(T::from_value(value).unwrap_or_else(|| default.clone()));
        }
        if self.default_nesting {
            if let Some(found) = json::try_find_path::<T>(options, key) {
                return Some(found);
            }
        }
        None
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        if let Some(found) = self.from_options(key, &default) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_bool(key, default);
            }
        }
        default
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        if let Some(found) = self.from_options(key, &default) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_int(key, default);
            }
        }
        default
    }

    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        if let Some(found) = self.from_options(key, &default) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_long(key, default);
            }
        }
        default
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        if let Some(found) = self.from_options(key, &default) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_float(key, default);
            }
        }
        default
    }

    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        if let Some(found) = self.from_options(key, &default) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_double(key, default);
            }
        }
        default
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        if let Some(found) = self.from_options(key, &default.to_string()) {
            return found;
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_string(key, default);
            }
        }
        default.to_string()
    }

    pub fn get_object(&self, key: &str) -> Option<Map<String, Value>> {
        if let Some(options) = self.options.as_ref() {
            let map = options.as_object()?;
            if let Some(value) = map.get(key) {
                if let Some(found) = Map::from_value(value) {
                    return Some(found);
                }
            } else if self.default_nesting {
                if let Some(found) = json::try_find_path::<Map<String, Value>>(options, key) {
                    return Some(found);
                }
            }
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_object(key).ok().flatten();
            }
        }
        None
    }

    pub fn get_array(&self, key: &str) -> Option<Vec<Value>> {
        if let Some(options) = self.options.as_ref() {
            let map = options.as_object()?;
            if let Some(value) = map.get(key) {
                if let Some(found) = Vec::from_value(value) {
                    return Some(found);
                }
            } else if self.default_nesting {
                if let Some(found) = json::try_find_path::<Vec<Value>>(options, key) {
                    return Some(found);
                }
            }
        }
        if let Some(settings) = &self.settings {
            if settings.contains(key) {
                return settings.get_array(key).ok().flatten();
            }
        }
        None
    }

    /// Descend one namespace segment in both sources at once: the child
    /// finder's document is the object under `key` here, its store the
    /// matching nested settings view.
    pub fn nested(&self, key: &str) -> OptionFinder {
        let options = self.get_object(key);
        let settings = self.settings.as_ref().map(|s| s.nested(key));
        OptionFinder {
            settings,
            options: options.map(Value::Object),
            default_nesting: self.default_nesting,
        }
    }
}
