use serde_json::{Map, Value};

/// Conversion out of a JSON value with the lenient coercions the typed
/// accessors rely on.
///
/// Scalar kinds accept the usual cross-representations: booleans also
/// parse `"true"`/`"false"` strings, integers and floats also parse
/// numeric strings and truncate or widen across each other, and `String`
/// stringifies any scalar. Containers only coerce from their own kind.
///
/// Asking for a kind outside this set is rejected at compile time, so a
/// misuse of the generic accessors can never surface as a runtime
/// condition.
pub trait JsonValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl JsonValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

impl JsonValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
            _ => None,
        }
    }
}

impl JsonValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).map(|v| v as i32)
    }
}

impl JsonValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl JsonValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl JsonValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl JsonValue for Map<String, Value> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.clone()),
            _ => None,
        }
    }
}

impl JsonValue for Vec<Value> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(list) => Some(list.clone()),
            _ => None,
        }
    }
}

/// Typed lookup of an object property; absent or uncoercible returns
/// `default`.
pub fn get_opt<T: JsonValue>(map: &Map<String, Value>, key: &str, default: T) -> T {
    match map.get(key) {
        Some(value) => T::from_value(value).unwrap_or(default),
        None => default,
    }
}

/// Typed lookup of an array element; out of range or uncoercible returns
/// `default`.
pub fn get_idx<T: JsonValue>(list: &[Value], index: usize, default: T) -> T {
    match list.get(index) {
        Some(value) => T::from_value(value).unwrap_or(default),
        None => default,
    }
}

/// Split a lookup path on `.` and `/`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(['.', '/']).collect()
}

/// Walk `segments` through nested objects and arrays, returning the leaf
/// value if every segment resolves. Array segments must parse as base-10
/// indexes.
pub fn find_path_value<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let (head, rest) = segments.split_first()?;
    let next = match root {
        Value::Object(map) => map.get(*head)?,
        Value::Array(list) => {
            let index: usize = head.parse().ok()?;
            list.get(index)?
        }
        _ => return None,
    };
    if rest.is_empty() {
        Some(next)
    } else {
        find_path_value(next, rest)
    }
}

/// Path lookup that reports absence as `None`. A leaf that is present but
/// does not coerce to `T` is also `None`, letting callers fall through to
/// their next source.
pub fn try_find_path<T: JsonValue>(root: &Value, path: &str) -> Option<T> {
    find_path_value(root, &split_path(path)).and_then(|value| T::from_value(value))
}

/// Path lookup with separate defaults for "present but uncoercible"
/// (`default`) and "absent anywhere along the path" (`missing`).
pub fn find_path<T: JsonValue>(root: &Value, path: &str, default: T, missing: T) -> T {
    match find_path_value(root, &split_path(path)) {
        Some(value) => T::from_value(value).unwrap_or(default),
        None => missing,
    }
}

/// True when `text` carries the delimiters of an encoded object or array.
///
/// This sniffing convention is how stored strings are told apart from
/// encoded structured values. A plain string that happens to carry the
/// same delimiters is indistinguishable; that ambiguity is inherent to
/// the encoding and callers should not store such strings raw.
pub fn looks_structured(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'))
}

/// Serialize a value to its stored string form. Objects and arrays use
/// their canonical JSON text; plain strings pass through unquoted; other
/// scalars use their locale-independent display form.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a stored string back into a value. Text sniffed as an object or
/// array is parsed as JSON, and a parse failure is surfaced: corrupt
/// stored text is a data-integrity condition distinct from absence.
/// Anything else is an opaque string.
pub fn decode(text: &str) -> Result<Value, serde_json::Error> {
    if looks_structured(text) {
        serde_json::from_str(text)
    } else {
        Ok(Value::String(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_coercions() {
        assert_eq!(bool::from_value(&json!(true)), Some(true));
        assert_eq!(bool::from_value(&json!("False")), Some(false));
        assert_eq!(bool::from_value(&json!(1)), None);
        assert_eq!(i64::from_value(&json!(12)), Some(12));
        assert_eq!(i64::from_value(&json!("12")), Some(12));
        assert_eq!(i64::from_value(&json!(12.9)), Some(12));
        assert_eq!(i32::from_value(&json!(7)), Some(7));
        assert_eq!(f64::from_value(&json!("2.5")), Some(2.5));
        assert_eq!(String::from_value(&json!(5)), Some("5".to_string()));
        assert_eq!(String::from_value(&json!([1])), None);
    }

    #[test]
    fn get_opt_falls_back_to_default() {
        let map = json!({"a": 1, "b": "text"});
        let map = map.as_object().unwrap();
        assert_eq!(get_opt(map, "a", 0i64), 1);
        assert_eq!(get_opt(map, "missing", 42i64), 42);
        assert_eq!(get_opt(map, "b", 42i64), 42, "uncoercible returns default");
    }

    #[test]
    fn get_idx_falls_back_to_default() {
        let list = json!([true, "5", 2.5]);
        let list = list.as_array().unwrap();
        assert_eq!(get_idx(list, 0, false), true);
        assert_eq!(get_idx(list, 1, 0i64), 5, "numeric string coerces");
        assert_eq!(get_idx(list, 9, 7i64), 7, "out of range returns default");
    }

    #[test]
    fn find_path_walks_objects_and_arrays() {
        let doc = json!({"a": {"b": [10, {"c": "deep"}]}});
        assert_eq!(
            try_find_path::<i64>(&doc, "a.b.0"),
            Some(10),
            "dotted path with array index"
        );
        assert_eq!(
            try_find_path::<String>(&doc, "a/b/1/c"),
            Some("deep".to_string()),
            "slash-separated path"
        );
        assert_eq!(try_find_path::<i64>(&doc, "a.b.x"), None, "non-numeric array index");
        assert_eq!(try_find_path::<i64>(&doc, "a.missing.c"), None);
    }

    #[test]
    fn find_path_distinguishes_default_from_missing() {
        let doc = json!({"a": {"b": []}});
        assert_eq!(find_path(&doc, "a.b", 1i64, -1i64), 1, "present but not an integer");
        assert_eq!(find_path(&doc, "a.c", 1i64, -1i64), -1, "absent leaf");
        assert_eq!(find_path(&doc, "x.y", 1i64, -1i64), -1, "absent branch");
    }

    #[test]
    fn codec_round_trips_containers() {
        let object = json!({"name": "Ann", "count": 3});
        let encoded = encode(&object);
        assert!(looks_structured(&encoded));
        assert_eq!(decode(&encoded).unwrap(), object);

        let array = json!([1, "two", {"three": 3}]);
        assert_eq!(decode(&encode(&array)).unwrap(), array);
    }

    #[test]
    fn codec_keeps_plain_strings_opaque() {
        assert_eq!(encode(&json!("hello")), "hello");
        assert_eq!(decode("hello").unwrap(), json!("hello"));
        assert_eq!(encode(&json!(true)), "true");
        assert_eq!(encode(&json!(2.5)), "2.5");
    }

    #[test]
    fn corrupt_structured_text_is_an_error() {
        assert!(decode("{not json}").is_err());
        assert!(decode("[1, 2,").is_ok(), "unterminated array is not sniffed");
    }
}
