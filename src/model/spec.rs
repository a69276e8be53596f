use log::warn;
use serde_json::{Map, Value};

/// Default name of the marker property that flags a nested JSON object
/// as a namespace update rather than an opaque stored document.
pub const NESTED_MARKER: &str = "__";

/// One desired assignment in an update document.
///
/// Incoming JSON is folded into this sum type up front, so the rest of
/// the diff logic never has to re-inspect a sentinel key: an object
/// carrying the marker becomes [`SpecValue::Namespace`] (marker
/// stripped), any other object or array becomes [`SpecValue::Opaque`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    /// Remove the key if present.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Recurse into the child namespace of the same name.
    Namespace(UpdateSpec),
    /// Compare and store the document as one encoded value.
    Opaque(Value),
}

impl SpecValue {
    fn from_json(value: &Value, marker: &str) -> Option<SpecValue> {
        Some(match value {
            Value::Null => SpecValue::Null,
            Value::Bool(b) => SpecValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SpecValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SpecValue::Float(f)
                } else {
                    return None;
                }
            }
            Value::String(s) => SpecValue::Str(s.clone()),
            Value::Array(_) => SpecValue::Opaque(value.clone()),
            Value::Object(map) => {
                if map.get(marker).and_then(Value::as_bool).unwrap_or(false) {
                    SpecValue::Namespace(UpdateSpec::from_json_with(map, marker))
                } else {
                    SpecValue::Opaque(value.clone())
                }
            }
        })
    }
}

/// An ordered document of key to desired value, the input to
/// diff/patch application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    entries: Vec<(String, SpecValue)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a JSON object into a spec using the default nested marker.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self::from_json_with(map, NESTED_MARKER)
    }

    /// Fold a JSON object into a spec. Marker keys are consumed by the
    /// namespace decision and never become entries of their own; values
    /// with no supported representation are logged and skipped.
    pub fn from_json_with(map: &Map<String, Value>, marker: &str) -> Self {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            if key == marker {
                continue;
            }
            match SpecValue::from_json(value, marker) {
                Some(spec) => entries.push((key.clone(), spec)),
                None => warn!("unsupported update value for `{key}`: {value}"),
            }
        }
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: SpecValue) -> &mut Self {
        self.entries.push((key.into(), value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
