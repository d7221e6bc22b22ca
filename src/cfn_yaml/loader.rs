//! YAML decoding with CloudFormation tag support.
//!
//! `serde_yml` does the event-level work; its `Value::Tagged` nodes carry
//! the `!Xxx` short-form tags, which are rewritten here into the long-form
//! single-key mappings used everywhere else in the crate.

use super::mappings;
use crate::error::{Error, Result};
use crate::odict::ODict;
use crate::value::Value;

/// Parse CloudFormation YAML into the ordered document model.
pub fn load_yaml(source: &str) -> Result<Value> {
    let raw: serde_yml::Value =
        serde_yml::from_str(source).map_err(|e| Error::InvalidYaml(e.to_string()))?;
    convert(raw)
}

fn convert(raw: serde_yml::Value) -> Result<Value> {
    match raw {
        serde_yml::Value::Null => Ok(Value::Null),
        serde_yml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yml::Value::Number(n) => Ok(convert_number(&n)),
        serde_yml::Value::String(s) => Ok(convert_scalar(s)),
        serde_yml::Value::Sequence(items) => Ok(Value::List(
            items.into_iter().map(convert).collect::<Result<_>>()?,
        )),
        serde_yml::Value::Mapping(mapping) => {
            let mut map = ODict::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(convert_key(key)?, convert(value)?);
            }
            Ok(Value::Map(map))
        }
        serde_yml::Value::Tagged(tagged) => convert_tagged(*tagged),
    }
}

/// Rewrite `!Xxx content` into `{long-form-key: content}`.
fn convert_tagged(tagged: serde_yml::value::TaggedValue) -> Result<Value> {
    let tag = tagged.tag.to_string();
    let suffix = tag.trim_start_matches('!');

    if suffix.is_empty() || suffix.contains(':') {
        return Err(Error::InvalidYaml(format!("Bad tag: {}", tag)));
    }

    let key = mappings::long_form_name(suffix);

    let value = if key == "Fn::GetAtt" {
        construct_getatt(tagged.value)?
    } else {
        convert(tagged.value)?
    };

    let mut map = ODict::with_capacity(1);
    map.insert(key, value);
    Ok(Value::Map(map))
}

/// Reconstruct `!GetAtt` content into a path-component list.
///
/// Only the first dot of a scalar separates resource from attribute;
/// the attribute part keeps any further dots. A sequence is taken as
/// path components verbatim.
fn construct_getatt(node: serde_yml::Value) -> Result<Value> {
    match node {
        serde_yml::Value::String(s) => Ok(Value::List(
            s.splitn(2, '.').map(Value::string).collect(),
        )),
        serde_yml::Value::Sequence(items) => {
            let mut path = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_yml::Value::String(s) => path.push(Value::String(s)),
                    other => {
                        return Err(Error::InvalidYaml(format!(
                            "Unexpected node in !GetAtt: {:?}",
                            other
                        )))
                    }
                }
            }
            Ok(Value::List(path))
        }
        other => Err(Error::InvalidYaml(format!(
            "Unexpected node in !GetAtt: {:?}",
            other
        ))),
    }
}

fn convert_number(n: &serde_yml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Long(i)
    } else if let Some(u) = n.as_u64() {
        Value::Double(u as f64)
    } else {
        Value::Double(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Plain date and datetime scalars become timestamps, keeping their raw
/// spelling. Everything else stays a string.
fn convert_scalar(s: String) -> Value {
    if is_timestamp(&s) {
        Value::Timestamp(s)
    } else {
        Value::String(s)
    }
}

fn convert_key(key: serde_yml::Value) -> Result<String> {
    match key {
        serde_yml::Value::String(s) => Ok(s),
        serde_yml::Value::Bool(b) => Ok(b.to_string()),
        serde_yml::Value::Number(n) => Ok(n.to_string()),
        serde_yml::Value::Null => Ok("null".to_string()),
        other => Err(Error::InvalidYaml(format!(
            "Unsupported mapping key: {:?}",
            other
        ))),
    }
}

/// `YYYY-MM-DD`, optionally followed by `T` or a space and `hh:mm:ss`
/// with an optional fraction.
pub(crate) fn is_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 10 || !is_date(&bytes[..10]) {
        return false;
    }
    if bytes.len() == 10 {
        return true;
    }
    if bytes[10] != b'T' && bytes[10] != b' ' {
        return false;
    }
    is_time(&bytes[11..])
}

fn is_date(b: &[u8]) -> bool {
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

fn is_time(b: &[u8]) -> bool {
    if b.len() < 8 {
        return false;
    }
    let well_formed = b[..8].iter().enumerate().all(|(i, c)| match i {
        2 | 5 => *c == b':',
        _ => c.is_ascii_digit(),
    });
    match &b[8..] {
        [] => well_formed,
        [b'.', frac @ ..] => {
            well_formed && !frac.is_empty() && frac.iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}
