use serde_json::{Map, Value};

const OPERATORS: &[&str] = &[
    "$set",
    "$unset",
    "$rename",
    "$push",
    "$pop",
    "$pull",
    "$pullAll",
    "$addToSet",
];

/// Accumulates MongoDB-style update operators into a partial-update
/// document.
///
/// Each operator section is created lazily on first use and holds a map
/// of property to payload; staging the same property twice under one
/// operator keeps the later payload. Map and collection payloads are
/// wrapped into their JSON representation on insertion, so callers never
/// pre-serialize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MongoPatch {
    data: Map<String, Value>,
}

impl MongoPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every operator section without discarding the accumulator.
    pub fn reset(&mut self) {
        for op in OPERATORS {
            self.data.remove(*op);
        }
    }

    fn patch_value(&mut self, op: &str, property: &str, value: Value) {
        let section = self
            .data
            .entry(op.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = section {
            section.insert(property.to_string(), value);
        }
    }

    pub fn set(&mut self, property: &str, value: impl Into<Value>) {
        self.patch_value("$set", property, value.into());
    }

    pub fn unset(&mut self, property: &str) {
        self.patch_value("$unset", property, Value::String(String::new()));
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) {
        self.patch_value("$rename", old_name, Value::String(new_name.to_string()));
    }

    pub fn push(&mut self, property: &str, value: impl Into<Value>) {
        self.patch_value("$push", property, value.into());
    }

    /// Push a batch of values, optionally at a position, via the
    /// `$each`/`$position` modifiers.
    pub fn push_all<I, T>(&mut self, property: &str, values: I, position: Option<i64>)
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut modifier = Map::new();
        modifier.insert(
            "$each".to_string(),
            Value::Array(values.into_iter().map(Into::into).collect()),
        );
        if let Some(position) = position {
            modifier.insert("$position".to_string(), Value::from(position));
        }
        self.push(property, Value::Object(modifier));
    }

    /// Remove the last element of an array property.
    pub fn pop(&mut self, property: &str) {
        self.patch_value("$pop", property, Value::from(1));
    }

    /// Remove the first element of an array property.
    pub fn shift(&mut self, property: &str) {
        self.patch_value("$pop", property, Value::from(-1));
    }

    pub fn pull(&mut self, property: &str, conditions: impl Into<Value>) {
        self.patch_value("$pull", property, conditions.into());
    }

    pub fn pull_all<I, T>(&mut self, property: &str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.patch_value(
            "$pullAll",
            property,
            Value::Array(values.into_iter().map(Into::into).collect()),
        );
    }

    pub fn add_to_set(&mut self, property: &str, value: impl Into<Value>) {
        self.patch_value("$addToSet", property, value.into());
    }

    /// Count of operator sections currently populated.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A patch is only worth sending once at least one operator is
    /// populated.
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn as_json(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}
