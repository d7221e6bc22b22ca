//! Opinionated template cleanup: replaces `Fn::Join` call trees with
//! equivalent, more readable `Fn::Sub` expressions.
//!
//! `clean` is a pure function over the document tree; the input is
//! consumed and a new tree is returned. Rewrites that cannot be performed
//! safely leave the affected node untouched and are never an error.

use crate::odict::ODict;
use crate::value::Value;

/// Recursively clean a document. Children are cleaned bottom-up, so
/// nested Joins have already become Subs by the time an outer Join
/// examines its parts.
pub fn clean(source: Value) -> Value {
    match source {
        Value::Map(map) => {
            let mut out = ODict::with_capacity(map.len());
            for (key, value) in map {
                if key == "Fn::Join" {
                    return convert_join(value);
                }
                if key == "Fn::GetAtt" {
                    out.insert(key, flatten_getatt(value));
                } else {
                    out.insert(key, clean(value));
                }
            }
            Value::Map(out)
        }
        Value::List(items) => Value::List(items.into_iter().map(clean).collect()),
        other => other,
    }
}

/// Standalone `Fn::GetAtt` nodes compact their path-sequence form into a
/// single dotted string. All segments are joined; a segment that already
/// contains a dot keeps it.
fn flatten_getatt(value: Value) -> Value {
    if let Value::List(items) = &value {
        let mut segments = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(s) => segments.push(s),
                None => return value,
            }
        }
        return Value::String(segments.join("."));
    }
    value
}

fn wrap_join(value: Value) -> Value {
    let mut map = ODict::with_capacity(1);
    map.insert("Fn::Join", value);
    Value::Map(map)
}

fn sub(template: String, args: ODict) -> Value {
    let mut map = ODict::with_capacity(1);
    if args.is_empty() {
        map.insert("Fn::Sub", Value::String(template));
    } else {
        map.insert(
            "Fn::Sub",
            Value::List(vec![Value::String(template), Value::Map(args)]),
        );
    }
    Value::Map(map)
}

/// Rewrite one `Fn::Join` into `Fn::Sub`, or refuse and return the node
/// unchanged when the argument shape is unexpected or the rewrite would
/// change meaning.
fn convert_join(value: Value) -> Value {
    let original = value.clone();

    let mut items = match value {
        Value::List(items) if items.len() == 2 => items,
        other => return wrap_join(other),
    };
    let parts = items.pop().expect("length checked");
    let sep = match items.pop() {
        Some(Value::String(s)) => s,
        _ => return wrap_join(original),
    };
    let parts = match parts {
        // A "join" whose parts are a bare string is already that string.
        Value::String(s) => return Value::String(s),
        Value::List(items) => items,
        _ => return wrap_join(original),
    };

    let mut plain_string = true;
    let mut args = ODict::new();
    let mut tokens = Vec::with_capacity(parts.len());

    for part in parts {
        let part = clean(part);
        match part {
            Value::Map(ref map) => {
                plain_string = false;

                if map.sole_key() == Some("Ref") {
                    if let Some(name) = map.get("Ref").and_then(Value::as_str) {
                        tokens.push(format!("${{{}}}", name));
                        continue;
                    }
                }
                if map.sole_key() == Some("Fn::GetAtt") {
                    if let Some(path) = map.get("Fn::GetAtt").and_then(getatt_token) {
                        tokens.push(format!("${{{}}}", path));
                        continue;
                    }
                }

                // A conditionally-absent argument breaks positional Join
                // semantics in ways Sub cannot represent.
                if contains_unsafe_conditional(&part) {
                    return wrap_join(original);
                }

                // Structurally equal arguments share one parameter slot.
                let existing = args
                    .iter()
                    .find(|(_, v)| *v == &part)
                    .map(|(k, _)| k.to_string());
                let name = match existing {
                    Some(name) => name,
                    None => {
                        let name = format!("Param{}", args.len() + 1);
                        args.insert(name.clone(), part.clone());
                        name
                    }
                };
                tokens.push(format!("${{{}}}", name));
            }
            Value::String(s) => {
                // Pre-existing ${...} text must not become a substitution.
                tokens.push(s.replace("${", "${!"));
            }
            _ => return wrap_join(original),
        }
    }

    let template = tokens.join(&sep);

    if plain_string {
        return Value::String(template);
    }
    sub(template, args)
}

/// Dotted substitution path for a `Fn::GetAtt` payload.
fn getatt_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::List(items) => {
            let mut segments = Vec::with_capacity(items.len());
            for item in items {
                segments.push(item.as_str()?);
            }
            Some(segments.join("."))
        }
        _ => None,
    }
}

/// True when the value contains an `Fn::If` conditional that can resolve
/// to the `AWS::NoValue` sentinel. Checked textually over the JSON
/// encoding, matching the breadth of the sentinel's possible positions.
fn contains_unsafe_conditional(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(text) => text.contains("Fn::If") && text.contains("AWS::NoValue"),
        Err(_) => true,
    }
}
