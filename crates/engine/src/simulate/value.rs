// AVMDBG - Algorand Virtual Machine Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Structured-data tree used as the intermediate form of the legacy decode path.
//!
//! [`EncodedValue`] is a closed set of node kinds. Unlike a JSON tree it can hold raw bytes, so
//! the legacy rewrite can turn base64 text into bytes before the typed model sees it. The tree
//! is itself a serde [`Deserializer`], which lets the typed model decode from it with the same
//! derives it uses for JSON.

use serde::{
    de::{
        self,
        value::{Error as ValueError, MapDeserializer, SeqDeserializer},
        IntoDeserializer, Visitor,
    },
    forward_to_deserialize_any, Deserializer,
};

/// A node of a structured document.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number, kept in its exact textual precision
    Number(serde_json::Number),
    /// Text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Ordered sequence
    List(Vec<EncodedValue>),
    /// Record whose entries keep document order
    Record(Vec<(String, EncodedValue)>),
}

impl EncodedValue {
    /// Look up a record entry. `None` for missing keys and non-record nodes.
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Record(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert a JSON tree node for node, without reinterpreting anything.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => {
                Self::Record(map.into_iter().map(|(k, v)| (k, Self::from_json(v))).collect())
            }
        }
    }
}

impl<'de> IntoDeserializer<'de, ValueError> for EncodedValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

impl<'de> Deserializer<'de> for EncodedValue {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Self::Null => visitor.visit_unit(),
            Self::Bool(b) => visitor.visit_bool(b),
            Self::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(f) = n.as_f64() {
                    visitor.visit_f64(f)
                } else {
                    Err(de::Error::custom(format!("number {n} is out of range")))
                }
            }
            Self::Text(s) => visitor.visit_string(s),
            Self::Bytes(b) => visitor.visit_byte_buf(b),
            Self::List(items) => {
                let mut seq = SeqDeserializer::<_, ValueError>::new(items.into_iter());
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Self::Record(entries) => {
                let mut map = MapDeserializer::<'de, _, ValueError>::new(entries.into_iter());
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Self::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text(variant) => {
                visitor.visit_enum(IntoDeserializer::<'de, ValueError>::into_deserializer(variant))
            }
            _ => Err(de::Error::custom("expected a unit variant name")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Sample {
        round: u64,
        label: Option<String>,
        missing: Option<u64>,
        payload: crate::Blob,
        items: Vec<i64>,
    }

    #[test]
    fn test_record_order_is_preserved() {
        let value = EncodedValue::from_json(json!({"z": 1, "a": 2, "m": 3}));
        let EncodedValue::Record(entries) = value else { panic!("expected a record") };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_typed_decode_from_tree() {
        let tree = EncodedValue::Record(vec![
            ("round".to_string(), EncodedValue::from_json(json!(7))),
            ("label".to_string(), EncodedValue::Text("x".to_string())),
            ("payload".to_string(), EncodedValue::Bytes(vec![1, 2])),
            ("items".to_string(), EncodedValue::from_json(json!([-1, 2]))),
            ("unknown".to_string(), EncodedValue::Bytes(vec![9])),
        ]);

        let sample = Sample::deserialize(tree).unwrap();
        assert_eq!(
            sample,
            Sample {
                round: 7,
                label: Some("x".to_string()),
                missing: None,
                payload: crate::Blob(vec![1, 2]),
                items: vec![-1, 2],
            }
        );
    }

    #[test]
    fn test_null_is_none() {
        let tree = EncodedValue::Null;
        assert_eq!(Option::<u64>::deserialize(tree).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let tree = EncodedValue::from_json(json!({"round": "seven", "payload": "", "items": []}));
        assert!(Sample::deserialize(tree).is_err());
    }

    #[test]
    fn test_get() {
        let tree = EncodedValue::from_json(json!({"version": 2}));
        assert_eq!(tree.get("version"), Some(&EncodedValue::from_json(json!(2))));
        assert_eq!(tree.get("other"), None);
        assert_eq!(EncodedValue::Null.get("version"), None);
    }
}
