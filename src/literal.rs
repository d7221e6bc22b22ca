//! Literal-preservation pass for embedded JSON payloads.
//!
//! Some resource properties hold an entire JSON document, notably the
//! state machine definition of `AWS::StepFunctions::StateMachine`. When
//! such a payload uses no intrinsic functions it reads far better as a
//! literal block of JSON text than as a deeply nested YAML mapping, so
//! this pass re-serializes it into a `Value::Literal`.
//!
//! This is a standalone walk over the document model, run after cleanup
//! on the YAML output path.

use crate::cfn_yaml::mappings;
use crate::json::dump_json;
use crate::odict::ODict;
use crate::value::Value;

const STATE_MACHINE_TYPE: &str = "AWS::StepFunctions::StateMachine";
const DEFINITION_KEY: &str = "DefinitionString";

/// Replace eligible embedded-JSON properties with literal strings.
pub fn preserve_literals(source: Value) -> Value {
    match source {
        Value::Map(map) => {
            let is_state_machine = map
                .get("Type")
                .and_then(Value::as_str)
                .map(|t| t == STATE_MACHINE_TYPE)
                .unwrap_or(false);

            let mut out = ODict::with_capacity(map.len());
            for (key, value) in map {
                let value = if is_state_machine && key == "Properties" {
                    convert_properties(value)
                } else {
                    preserve_literals(value)
                };
                out.insert(key, value);
            }
            Value::Map(out)
        }
        Value::List(items) => {
            Value::List(items.into_iter().map(preserve_literals).collect())
        }
        other => other,
    }
}

fn convert_properties(value: Value) -> Value {
    let Value::Map(props) = value else {
        return preserve_literals(value);
    };

    let mut out = ODict::with_capacity(props.len());
    for (key, value) in props {
        let value = if key == DEFINITION_KEY
            && matches!(value, Value::Map(_))
            && is_plain_document(&value)
        {
            Value::Literal(dump_json(&value))
        } else {
            preserve_literals(value)
        };
        out.insert(key, value);
    }
    Value::Map(out)
}

/// True for a mapping that contains no intrinsic function calls at any
/// depth. Only such payloads can safely become opaque text.
fn is_plain_document(value: &Value) -> bool {
    match value {
        Value::Map(map) => map
            .iter()
            .all(|(key, value)| !mappings::is_intrinsic_key(key) && is_plain_document(value)),
        Value::List(items) => items.iter().all(is_plain_document),
        _ => true,
    }
}
