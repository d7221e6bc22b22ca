use crate::error::{Error, Result};
use crate::value::Value;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Parse JSON text into the ordered document model.
pub fn load_json(source: &str) -> Result<Value> {
    serde_json::from_str(source).map_err(|e| Error::InvalidJson(e.to_string()))
}

/// Pretty-print a document as JSON: 4-space indent, key order preserved,
/// non-ASCII characters emitted as-is.
pub fn dump_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .expect("JSON encoding of an in-memory document cannot fail");
    String::from_utf8(buf).expect("serde_json produces UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_json_preserves_order() {
        let source = r#"
        {
            "z": "first",
            "m": "middle",
            "a": "last"
        }
        "#;

        let actual = load_json(source).unwrap();
        let map = actual.as_map().unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "m", "a"]);
        assert_eq!(map.get("z"), Some(&Value::string("first")));
        assert_eq!(map.get("m"), Some(&Value::string("middle")));
        assert_eq!(map.get("a"), Some(&Value::string("last")));
    }

    #[test]
    fn test_load_json_rejects_garbage() {
        let err = load_json("<!DOCTYPE html>").unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)));
    }

    #[test]
    fn test_load_json_rejects_yaml() {
        let err = load_json("z: first\nm: middle\n").unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)));
    }

    #[test]
    fn test_dump_json_indent_and_order() {
        let value = Value::from(json!({"z": 1, "a": ["x"]}));

        assert_eq!(
            dump_json(&value),
            "{\n    \"z\": 1,\n    \"a\": [\n        \"x\"\n    ]\n}"
        );
    }

    #[test]
    fn test_dump_json_timestamps() {
        let value = Value::Map(crate::odict::ODict::from_pairs([
            ("m".to_string(), Value::Timestamp("2012-05-02".to_string())),
            (
                "a".to_string(),
                Value::Timestamp("2012-05-02 03:45:00".to_string()),
            ),
        ]));

        let actual = dump_json(&value);

        assert!(actual.contains("\"2012-05-02\""));
        assert!(actual.contains("\"2012-05-02T03:45:00\""));
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let source = "{\n    \"z\": \"first\",\n    \"m\": [\n        1,\n        2\n    ],\n    \"a\": {\n        \"nested\": true\n    }\n}";

        let parsed = load_json(source).unwrap();

        assert_eq!(dump_json(&parsed), source);
    }
}
