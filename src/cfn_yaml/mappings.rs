//! CloudFormation intrinsic function tag naming rules.
//!
//! YAML short form `!Xxx` stands for the JSON object form `{"Fn::Xxx": ...}`,
//! with two AWS-defined exceptions that carry no `Fn::` prefix.

pub(crate) const FN_PREFIX: &str = "Fn::";

/// Tags that map to their suffix directly, without the `Fn::` prefix.
pub(crate) const UNCONVERTED_SUFFIXES: [&str; 2] = ["Ref", "Condition"];

/// Long-form key for a `!Xxx` tag suffix: `Ref` and `Condition` pass
/// through, everything else gains the `Fn::` prefix.
pub(crate) fn long_form_name(tag_suffix: &str) -> String {
    if UNCONVERTED_SUFFIXES.contains(&tag_suffix) {
        tag_suffix.to_string()
    } else {
        format!("{}{}", FN_PREFIX, tag_suffix)
    }
}

/// Short-form tag for a long-form key, or `None` when the key is not
/// eligible for tag shorthand.
pub(crate) fn shorthand_tag(key: &str) -> Option<String> {
    if UNCONVERTED_SUFFIXES.contains(&key) {
        return Some(format!("!{}", key));
    }
    key.strip_prefix(FN_PREFIX).map(|suffix| format!("!{}", suffix))
}

/// True for keys that denote an intrinsic function when they are the sole
/// key of a mapping.
pub(crate) fn is_intrinsic_key(key: &str) -> bool {
    UNCONVERTED_SUFFIXES.contains(&key) || key.starts_with(FN_PREFIX)
}
