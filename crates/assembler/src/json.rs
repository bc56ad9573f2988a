//! The JSON value model.
//!
//! A template's JSON side-channel is parsed once into a closed [`JsonValue`]
//! tree. Everything downstream matches on the variant exhaustively instead of
//! probing types at run time. Objects keep their keys sorted, which fixes the
//! order in which the binder visits them.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    String(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl JsonValue {
    /// Truthiness for conditional blocks.
    ///
    /// `"true"`/`"false"` strings map directly (ignoring ASCII case), other
    /// strings are true when non-empty, numbers when non-zero. Null, arrays
    /// and objects are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            JsonValue::Bool(b) => *b,
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => true,
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => false,
            JsonValue::String(s) => !s.is_empty(),
            JsonValue::Integer(i) => *i != 0,
            JsonValue::Number(n) => *n != 0.0,
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => false,
        }
    }

    /// Text form of a scalar. Null renders empty; arrays and objects have none.
    ///
    /// ```rust
    /// use assembler::JsonValue;
    ///
    /// assert_eq!(JsonValue::Integer(3).as_text().as_deref(), Some("3"));
    /// assert_eq!(JsonValue::Number(2.5).as_text().as_deref(), Some("2.5"));
    /// assert_eq!(JsonValue::Null.as_text().as_deref(), Some(""));
    /// assert_eq!(JsonValue::Array(vec![]).as_text(), None);
    /// ```
    pub fn as_text(&self) -> Option<String> {
        match self {
            JsonValue::Null => Some(String::new()),
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Integer(i) => Some(i.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::String(_) => "string",
            JsonValue::Number(_) => "number",
            JsonValue::Integer(_) => "integer",
            JsonValue::Bool(_) => "bool",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => JsonValue::Integer(i),
                None => JsonValue::Number(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Number(n) => serializer.serialize_f64(*n),
            JsonValue::Integer(i) => serializer.serialize_i64(*i),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Array(items) => serializer.collect_seq(items),
            JsonValue::Object(object) => object.serialize(serializer),
        }
    }
}

/// A JSON object with sorted keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject(BTreeMap<String, JsonValue>);

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a side-channel document.
    ///
    /// Anything other than a well-formed object yields an empty object:
    /// bad data degrades binding, it never fails a merge.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| (k, JsonValue::from(v)))
                .collect(),
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "JSON root is not an object, binding empty data");
                Self::new()
            }
            Err(error) => {
                tracing::debug!(%error, "malformed JSON, binding empty data");
                Self::new()
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Exact key first, then the first key equal ignoring ASCII case.
    pub fn lookup(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, JsonValue)> for JsonObject {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for JsonObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
