use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::rc::Rc;

pub type ValueMap = BTreeMap<String, FormValue>;

/// A node in the form data tree.
///
/// Containers sit behind `Rc` so that a new version of the tree can share every
/// subtree it did not touch with the previous one. `same_node` exposes that
/// sharing to callers that want to skip work for unchanged branches.
#[derive(Debug, Clone, Default)]
pub enum FormValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Rc<Vec<FormValue>>),
    Map(Rc<ValueMap>),
}

impl FormValue {
    pub fn empty_map() -> Self {
        FormValue::Map(Rc::new(ValueMap::new()))
    }

    pub fn empty_list() -> Self {
        FormValue::List(Rc::new(Vec::new()))
    }

    pub fn from_map(map: ValueMap) -> Self {
        FormValue::Map(Rc::new(map))
    }

    pub fn from_list(items: Vec<FormValue>) -> Self {
        FormValue::List(Rc::new(items))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            FormValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Empty text and null both count as "nothing entered".
    pub fn is_blank(&self) -> bool {
        matches!(self, FormValue::Null) || matches!(self, FormValue::Text(text) if text.is_empty())
    }

    /// True when both values are the same container allocation.
    pub fn same_node(&self, other: &FormValue) -> bool {
        match (self, other) {
            (FormValue::List(a), FormValue::List(b)) => Rc::ptr_eq(a, b),
            (FormValue::Map(a), FormValue::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The text an input control shows for this value.
    pub fn to_input_string(&self) -> String {
        match self {
            FormValue::Null | FormValue::List(_) | FormValue::Map(_) => String::new(),
            FormValue::Bool(flag) => flag.to_string(),
            FormValue::Number(number) => number.to_string(),
            FormValue::Text(text) => text.clone(),
        }
    }
}

impl PartialEq for FormValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FormValue::Null, FormValue::Null) => true,
            (FormValue::Bool(a), FormValue::Bool(b)) => a == b,
            (FormValue::Number(a), FormValue::Number(b)) => a == b,
            (FormValue::Text(a), FormValue::Text(b)) => a == b,
            (FormValue::List(a), FormValue::List(b)) => Rc::ptr_eq(a, b) || a == b,
            (FormValue::Map(a), FormValue::Map(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Number(value as f64)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<Vec<FormValue>> for FormValue {
    fn from(value: Vec<FormValue>) -> Self {
        FormValue::from_list(value)
    }
}

impl From<ValueMap> for FormValue {
    fn from(value: ValueMap) -> Self {
        FormValue::from_map(value)
    }
}

impl From<serde_json::Value> for FormValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FormValue::Null,
            serde_json::Value::Bool(flag) => FormValue::Bool(flag),
            serde_json::Value::Number(number) => {
                number.as_f64().map_or(FormValue::Null, FormValue::Number)
            }
            serde_json::Value::String(text) => FormValue::Text(text),
            serde_json::Value::Array(items) => {
                FormValue::from_list(items.into_iter().map(FormValue::from).collect())
            }
            serde_json::Value::Object(map) => FormValue::from_map(
                map.into_iter()
                    .map(|(key, value)| (key, FormValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&FormValue> for serde_json::Value {
    fn from(value: &FormValue) -> Self {
        match value {
            FormValue::Null => serde_json::Value::Null,
            FormValue::Bool(flag) => serde_json::Value::Bool(*flag),
            FormValue::Number(number) => serde_json::Number::from_f64(*number)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            FormValue::Text(text) => serde_json::Value::String(text.clone()),
            FormValue::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            FormValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormValue::Null => serializer.serialize_unit(),
            FormValue::Bool(flag) => serializer.serialize_bool(*flag),
            // whole numbers go out the way a browser would print them
            FormValue::Number(number)
                if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 =>
            {
                serializer.serialize_i64(*number as i64)
            }
            FormValue::Number(number) => serializer.serialize_f64(*number),
            FormValue::Text(text) => serializer.serialize_str(text),
            FormValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FormValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FormValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(FormValue::from)
    }
}
