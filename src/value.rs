use crate::cfn_yaml::mappings;
use crate::odict::ODict;
use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A parsed template node.
///
/// This is the intermediate representation shared by both codecs: the JSON
/// and YAML decoders produce it, the normalizer rewrites it, and the
/// encoders consume it. Mappings are [`ODict`] so that key order survives
/// every transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    /// A plain YAML date or datetime scalar, kept as its raw text.
    /// The JSON encoder normalizes it to ISO-8601.
    Timestamp(String),
    /// A string that must be emitted as a YAML literal block.
    /// Produced only by the literal-preservation pass.
    Literal(String),
    List(Vec<Value>),
    Map(ODict),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ODict> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Return `(key, value)` if this node is an intrinsic function call:
    /// a single-key mapping whose key is `Ref`, `Condition` or `Fn::*`.
    pub fn intrinsic(&self) -> Option<(&str, &Value)> {
        let map = self.as_map()?;
        let key = map.sole_key()?;
        if mappings::is_intrinsic_key(key) {
            Some((key, map.get(key)?))
        } else {
            None
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Long(n) => serializer.serialize_i64(*n),
            Value::Double(n) => serializer.serialize_f64(*n),
            Value::String(s) | Value::Literal(s) => serializer.serialize_str(s),
            // The date/time hook: YAML allows a space between date and time
            // of day, ISO-8601 wants a "T".
            Value::Timestamp(s) => serializer.serialize_str(&s.replacen(' ', "T", 1)),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a CloudFormation template value")
            }

            fn visit_bool<E>(self, b: bool) -> Result<Value, E> {
                Ok(Value::Bool(b))
            }

            fn visit_i64<E>(self, n: i64) -> Result<Value, E> {
                Ok(Value::Long(n))
            }

            fn visit_u64<E>(self, n: u64) -> Result<Value, E> {
                if n <= i64::MAX as u64 {
                    Ok(Value::Long(n as i64))
                } else {
                    Ok(Value::Double(n as f64))
                }
            }

            fn visit_f64<E>(self, n: f64) -> Result<Value, E> {
                Ok(Value::Double(n))
            }

            fn visit_str<E>(self, s: &str) -> Result<Value, E> {
                Ok(Value::String(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> Result<Value, E> {
                Ok(Value::String(s))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // Entries arrive in document order; ODict keeps them that way.
                let mut map = ODict::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Conversion from `serde_json::Value`, mainly for building fixtures with
/// the `json!` macro. Relies on serde_json's `preserve_order` feature for
/// object key order.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Long(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intrinsic_detection() {
        let node = Value::from(json!({"Ref": "Cake"}));
        assert_eq!(node.intrinsic(), Some(("Ref", &Value::string("Cake"))));

        let node = Value::from(json!({"Fn::GetAtt": ["A", "B"]}));
        assert!(node.intrinsic().is_some());

        // Two keys: an ordinary mapping, even if one key is Ref
        let node = Value::from(json!({"Ref": "Cake", "Other": 1}));
        assert_eq!(node.intrinsic(), None);

        // Single key outside the intrinsic set
        let node = Value::from(json!({"Type": "AWS::S3::Bucket"}));
        assert_eq!(node.intrinsic(), None);
    }

    #[test]
    fn test_json_value_conversion_keeps_order() {
        let node = Value::from(json!({"z": 1, "m": 2, "a": 3}));
        let map = node.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "m", "a"]);
    }

    #[test]
    fn test_timestamp_serializes_as_iso8601() {
        let node = Value::Timestamp("2017-03-02 19:52:00".to_string());
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            "\"2017-03-02T19:52:00\""
        );
    }
}
