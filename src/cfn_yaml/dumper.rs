//! Block-style YAML emitter with CloudFormation tag shorthand.
//!
//! The emitter receives mapping entries as an explicitly ordered sequence
//! and never sorts them. Single-key intrinsic mappings collapse to `!Xxx`
//! tag shorthand unless long-form output is requested. Block sequences are
//! indented one level further than the conventional YAML default so the
//! `-` markers sit under their parent key; this causes fewer problems with
//! validation tools.

use super::loader::is_timestamp;
use super::mappings;
use crate::config::CONFIG;
use crate::value::Value;

/// Output style switches. One configurable emitter replaces a family of
/// near-identical dumper variants: standard, clean, long-form and
/// clean+long-form are all combinations of these two flags.
#[derive(Debug, Clone)]
pub struct DumperOptions {
    /// Prefer literal block style for multiline strings and flow style
    /// for tagged sequences.
    pub clean_up: bool,
    /// Always emit the full `Fn::*` object form, never tag shorthand.
    pub long_form: bool,
    /// Lines longer than this disqualify a string from literal block style.
    pub max_col_width: usize,
}

impl Default for DumperOptions {
    fn default() -> Self {
        DumperOptions {
            clean_up: false,
            long_form: false,
            max_col_width: CONFIG.max_col_width,
        }
    }
}

/// Serialize a document as CloudFormation YAML.
pub fn dump_yaml(value: &Value, opts: &DumperOptions) -> String {
    let mut out = String::new();

    match value {
        Value::Map(map) if !map.is_empty() => {
            if let Some((key, inner)) = shorthand(value, opts) {
                emit_tagged(key, inner, 0, opts, &mut out);
            } else {
                emit_map_block(map, 0, opts, &mut out);
            }
        }
        Value::List(items) if !items.is_empty() => {
            emit_seq_block(items, 0, opts, &mut out);
        }
        Value::Map(_) => out.push_str("{}\n"),
        Value::List(_) => out.push_str("[]\n"),
        scalar => {
            let style = pick_style(scalar, opts, false);
            emit_scalar(scalar, style, 0, &mut out);
            // A bare plain scalar needs the document-end marker to be
            // an unambiguous YAML stream.
            if style == Style::Plain {
                out.push_str("...\n");
            }
        }
    }

    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// The `(key, payload)` of a node that should collapse to tag shorthand.
fn shorthand<'a>(value: &'a Value, opts: &DumperOptions) -> Option<(&'a str, &'a Value)> {
    if opts.long_form {
        None
    } else {
        value.intrinsic()
    }
}

fn emit_map_block(map: &crate::odict::ODict, depth: usize, opts: &DumperOptions, out: &mut String) {
    for (key, value) in map.iter() {
        indent(depth, out);
        emit_entry(key, value, depth, opts, out);
    }
}

/// Like [`emit_map_block`] but the first entry continues the current line
/// (used for mappings that are sequence items: `- key: value`).
fn emit_map_inline_first(
    map: &crate::odict::ODict,
    depth: usize,
    opts: &DumperOptions,
    out: &mut String,
) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            indent(depth, out);
        }
        emit_entry(key, value, depth, opts, out);
    }
}

fn emit_key(key: &str, out: &mut String) {
    if key.contains('\n') || key.chars().any(|c| c.is_control()) {
        push_double_quoted(key, out);
    } else if needs_quote(key) {
        push_quoted(key, out);
    } else {
        out.push_str(key);
    }
}

/// One `key: value` entry; the key's indentation has already been written.
fn emit_entry(key: &str, value: &Value, depth: usize, opts: &DumperOptions, out: &mut String) {
    emit_key(key, out);
    out.push(':');

    if let Some((fn_key, inner)) = shorthand(value, opts) {
        out.push(' ');
        emit_tagged(fn_key, inner, depth, opts, out);
        return;
    }

    match value {
        Value::Map(map) if map.is_empty() => out.push_str(" {}\n"),
        Value::List(items) if items.is_empty() => out.push_str(" []\n"),
        Value::Map(map) => {
            out.push('\n');
            emit_map_block(map, depth + 1, opts, out);
        }
        Value::List(items) => {
            out.push('\n');
            emit_seq_block(items, depth + 1, opts, out);
        }
        scalar => {
            out.push(' ');
            let style = pick_style(scalar, opts, false);
            emit_scalar(scalar, style, depth, out);
        }
    }
}

fn emit_seq_block(items: &[Value], depth: usize, opts: &DumperOptions, out: &mut String) {
    for item in items {
        indent(depth, out);
        out.push_str("- ");
        emit_item(item, depth, opts, out);
    }
}

/// A sequence item; the `- ` marker has already been written. `depth` is
/// the marker's depth, continuation lines start one level deeper.
fn emit_item(item: &Value, depth: usize, opts: &DumperOptions, out: &mut String) {
    if let Some((fn_key, inner)) = shorthand(item, opts) {
        emit_tagged(fn_key, inner, depth, opts, out);
        return;
    }

    match item {
        Value::Map(map) if map.is_empty() => out.push_str("{}\n"),
        Value::List(items) if items.is_empty() => out.push_str("[]\n"),
        Value::Map(map) => emit_map_inline_first(map, depth + 1, opts, out),
        Value::List(items) => {
            // Nested sequence: first item continues the marker line.
            for (i, nested) in items.iter().enumerate() {
                if i > 0 {
                    indent(depth + 1, out);
                }
                out.push_str("- ");
                emit_item(nested, depth + 1, opts, out);
            }
        }
        scalar => {
            let style = pick_style(scalar, opts, false);
            emit_scalar(scalar, style, depth, out);
        }
    }
}

/// Emit an intrinsic in `!Tag` shorthand. The payload keeps its native
/// node kind, except `Fn::GetAtt` path lists which are dot-joined first.
fn emit_tagged(fn_key: &str, inner: &Value, depth: usize, opts: &DumperOptions, out: &mut String) {
    let tag = mappings::shorthand_tag(fn_key).expect("caller checked tag eligibility");

    let joined;
    let mut payload = inner;
    if fn_key == "Fn::GetAtt" {
        if let Some(path) = getatt_path(inner) {
            joined = Value::String(path);
            payload = &joined;
        }
    }

    out.push_str(&tag);

    match payload {
        Value::Map(map) if map.is_empty() => out.push_str(" {}\n"),
        Value::List(items) if items.is_empty() => out.push_str(" []\n"),
        Value::Map(map) => {
            // The payload mapping itself cannot take a second tag; only
            // values nested below it collapse again.
            out.push('\n');
            emit_map_block(map, depth + 1, opts, out);
        }
        Value::List(items) => {
            if opts.clean_up {
                out.push_str(" [");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    emit_flow(item, opts, false, out);
                }
                out.push_str("]\n");
            } else {
                out.push('\n');
                emit_seq_block(items, depth + 1, opts, out);
            }
        }
        scalar => {
            out.push(' ');
            let style = pick_style(scalar, opts, true);
            emit_scalar(scalar, style, depth, out);
        }
    }
}

/// Join `Fn::GetAtt` path components with dots. All segments are joined;
/// the two-element form is just the common case.
fn getatt_path(inner: &Value) -> Option<String> {
    let items = inner.as_list()?;
    let mut segments = Vec::with_capacity(items.len());
    for item in items {
        segments.push(item.as_str()?);
    }
    Some(segments.join("."))
}

// ---------------------------------------------------------------------------
// Flow style (clean output collapses tagged sequences onto one line)
// ---------------------------------------------------------------------------

fn emit_flow(value: &Value, opts: &DumperOptions, after_tag: bool, out: &mut String) {
    if let Some((fn_key, inner)) = shorthand(value, opts) {
        let tag = mappings::shorthand_tag(fn_key).expect("caller checked tag eligibility");
        out.push_str(&tag);
        out.push(' ');

        if fn_key == "Fn::GetAtt" {
            if let Some(path) = getatt_path(inner) {
                emit_flow(&Value::String(path), opts, true, out);
                return;
            }
        }
        if let Value::Map(map) = inner {
            emit_flow_map(map, opts, out);
            return;
        }
        emit_flow(inner, opts, true, out);
        return;
    }

    match value {
        Value::Map(map) => emit_flow_map(map, opts, out),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                emit_flow(item, opts, false, out);
            }
            out.push(']');
        }
        Value::String(s) | Value::Literal(s) => {
            if s.contains('\n') || s.chars().any(|c| c.is_control()) {
                push_double_quoted(s, out);
            } else if after_tag || flow_needs_quote(s) {
                push_quoted(s, out);
            } else {
                out.push_str(s);
            }
        }
        Value::Timestamp(s) => out.push_str(s),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Long(n) => out.push_str(&n.to_string()),
        Value::Double(n) => out.push_str(&format_double(*n)),
    }
}

fn emit_flow_map(map: &crate::odict::ODict, opts: &DumperOptions, out: &mut String) {
    out.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if flow_needs_quote(key) {
            push_quoted(key, out);
        } else {
            out.push_str(key);
        }
        out.push_str(": ");
        emit_flow(value, opts, false, out);
    }
    out.push('}');
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Plain,
    Single,
    Double,
    LiteralBlock,
}

fn pick_style(value: &Value, opts: &DumperOptions, after_tag: bool) -> Style {
    let s = match value {
        Value::Literal(s) => {
            return if block_representable(s, opts.max_col_width) {
                Style::LiteralBlock
            } else {
                Style::Double
            }
        }
        Value::String(s) => s,
        // Timestamps and other scalars re-emit in their plain spelling.
        _ => return Style::Plain,
    };

    if s.contains('\n') {
        if opts.clean_up && block_representable(s, opts.max_col_width) {
            Style::LiteralBlock
        } else {
            Style::Double
        }
    } else if s.chars().any(|c| c.is_control()) {
        Style::Double
    } else if after_tag || needs_quote(s) {
        Style::Single
    } else {
        Style::Plain
    }
}

/// Write a scalar plus the closing newline. For literal blocks,
/// continuation lines start one level below `depth`.
fn emit_scalar(value: &Value, style: Style, depth: usize, out: &mut String) {
    let text;
    let s = match value {
        Value::String(s) | Value::Literal(s) | Value::Timestamp(s) => s.as_str(),
        Value::Null => "null",
        Value::Bool(b) => {
            if *b {
                "true"
            } else {
                "false"
            }
        }
        Value::Long(n) => {
            text = n.to_string();
            text.as_str()
        }
        Value::Double(n) => {
            text = format_double(*n);
            text.as_str()
        }
        Value::List(_) | Value::Map(_) => unreachable!("containers are not scalars"),
    };

    match style {
        Style::Plain => {
            out.push_str(s);
            out.push('\n');
        }
        Style::Single => {
            push_quoted(s, out);
            out.push('\n');
        }
        Style::Double => {
            push_double_quoted(s, out);
            out.push('\n');
        }
        Style::LiteralBlock => {
            let body = s.strip_suffix('\n');
            out.push_str(if body.is_some() { "|\n" } else { "|-\n" });
            for line in body.unwrap_or(s).split('\n') {
                if !line.is_empty() {
                    indent(depth + 1, out);
                    out.push_str(line);
                }
                out.push('\n');
            }
        }
    }
}

/// Whether a string survives the literal block style unchanged: no
/// carriage returns or other control characters, no leading whitespace on
/// the first line, at most one trailing newline, and no line longer than
/// the configured column width.
fn block_representable(s: &str, max_col_width: usize) -> bool {
    if s.is_empty() || s.ends_with("\n\n") {
        return false;
    }
    if s.starts_with(' ') || s.starts_with('\t') {
        return false;
    }
    if s.chars().any(|c| c.is_control() && c != '\n') {
        return false;
    }
    s.split('\n').all(|line| line.len() <= max_col_width)
}

/// Whether a plain (unquoted) block scalar would be misread on reload.
fn needs_quote(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    // Leading zeros read back as octal or get renumbered; this also
    // covers 12-digit AWS account IDs.
    if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    // Numbers, booleans and null-ish words must stay strings.
    if s.parse::<f64>().is_ok() {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return true;
    }
    if (lower.starts_with("0x") || lower.starts_with("0o")) && s.len() > 2 {
        return true;
    }
    // Date-shaped strings would come back as timestamps.
    if is_timestamp(s) {
        return true;
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return true;
    }
    let first = s.chars().next().unwrap();
    if "!&*%@`\"'#,[]{}|>".contains(first) {
        return true;
    }
    // `-`, `?` and `:` are only indicators when followed by a space.
    if matches!(first, '-' | '?' | ':') && (s.len() == 1 || s.as_bytes()[1] == b' ') {
        return true;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") || s.contains('\t') {
        return true;
    }
    false
}

/// Flow context adds the flow indicators to the unsafe set.
fn flow_needs_quote(s: &str) -> bool {
    needs_quote(s) || s.chars().any(|c| ",[]{}:".contains(c))
}

fn push_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
}

fn push_double_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn format_double(n: f64) -> String {
    if n.is_nan() {
        ".nan".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            ".inf".to_string()
        } else {
            "-.inf".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dump(v: serde_json::Value) -> String {
        dump_yaml(&Value::from(v), &DumperOptions::default())
    }

    fn dump_clean(v: serde_json::Value) -> String {
        let opts = DumperOptions {
            clean_up: true,
            ..DumperOptions::default()
        };
        dump_yaml(&Value::from(v), &opts)
    }

    #[test]
    fn test_plain_mapping_keeps_order() {
        let actual = dump(json!({"z": "first", "m": "middle", "a": "last"}));
        assert_eq!(actual, "z: first\nm: middle\na: last\n");
    }

    #[test]
    fn test_unconverted_types() {
        assert_eq!(dump(json!({"Ref": "something"})), "!Ref 'something'\n");
        assert_eq!(
            dump(json!({"Condition": "something"})),
            "!Condition 'something'\n"
        );
        assert_eq!(dump(json!({"Fn::Sub": "something"})), "!Sub 'something'\n");
        assert_eq!(
            dump(json!({"Fn::GetAtt": "something"})),
            "!GetAtt 'something'\n"
        );
    }

    #[test]
    fn test_getatt_joins_all_segments() {
        assert_eq!(
            dump(json!({"Fn::GetAtt": ["Left", "Right"]})),
            "!GetAtt 'Left.Right'\n"
        );
        assert_eq!(
            dump(json!({"Fn::GetAtt": ["First", "Second", "Third"]})),
            "!GetAtt 'First.Second.Third'\n"
        );
    }

    #[test]
    fn test_dotted_getatt_list() {
        let actual = dump(json!([
            {"Fn::GetAtt": "One.Two"},
            {"Fn::GetAtt": "Three.Four.Five"},
        ]));
        assert_eq!(actual, "- !GetAtt 'One.Two'\n- !GetAtt 'Three.Four.Five'\n");
    }

    #[test]
    fn test_tagged_sequence_block_style() {
        let actual = dump(json!({
            "m": {"Fn::Sub": ["The cake is a ${CakeType}", {"CakeType": "lie"}]}
        }));
        assert_eq!(
            actual,
            "m: !Sub\n  - The cake is a ${CakeType}\n  - CakeType: lie\n"
        );
    }

    #[test]
    fn test_tagged_sequence_flow_style_when_clean() {
        let actual = dump_clean(json!({
            "Fn::Sub": [
                "The Cake is a ${Param1}",
                {"Param1": {"Fn::ImportValue": "LieStack-lieValue"}},
            ]
        }));
        assert_eq!(
            actual,
            "!Sub ['The Cake is a ${Param1}', {Param1: !ImportValue 'LieStack-lieValue'}]\n"
        );
    }

    #[test]
    fn test_tagged_payload_map_is_not_double_tagged() {
        let actual = dump_clean(json!({
            "Fn::Sub": [
                "a ${Param1}",
                {"Param1": {"Fn::ImportValue": {"Fn::Sub": "${lieStack}-lieValue"}}},
            ]
        }));
        assert_eq!(
            actual,
            "!Sub ['a ${Param1}', {Param1: !ImportValue {'Fn::Sub': '${lieStack}-lieValue'}}]\n"
        );
    }

    #[test]
    fn test_long_form() {
        let opts = DumperOptions {
            long_form: true,
            ..DumperOptions::default()
        };
        let actual = dump_yaml(&Value::from(json!({"Ref": "Cake"})), &opts);
        assert_eq!(actual, "Ref: Cake\n");
    }

    #[test]
    fn test_newline_strings_are_double_quoted() {
        let actual = dump(json!(["a", "b\n", "c\r\n", "d\r"]));
        assert_eq!(actual, "- a\n- \"b\\n\"\n- \"c\\r\\n\"\n- \"d\\r\"\n");
    }

    #[test]
    fn test_clean_multiline_uses_literal_block() {
        let actual = dump_clean(json!({
            "start": "This is\na multi-line\nstring"
        }));
        assert_eq!(actual, "start: |-\n  This is\n  a multi-line\n  string\n");
    }

    #[test]
    fn test_clean_nested_literal_block() {
        let actual = dump_clean(json!({
            "outer": {
                "inner": "#!/bin/bash\nyum -y update\nyum install python",
                "subbed": {"Fn::Sub": "The cake\nis\n${CakeType}"},
            }
        }));
        assert_eq!(
            actual,
            "outer:\n  inner: |-\n    #!/bin/bash\n    yum -y update\n    yum install python\n  subbed: !Sub |-\n    The cake\n    is\n    ${CakeType}\n"
        );
    }

    #[test]
    fn test_clean_long_lines_fall_back_to_quoting() {
        let opts = DumperOptions {
            clean_up: true,
            long_form: false,
            max_col_width: 10,
        };
        let actual = dump_yaml(&Value::from(json!({"k": "a line\nfar too long for ten columns"})), &opts);
        assert_eq!(actual, "k: \"a line\\nfar too long for ten columns\"\n");
    }

    #[test]
    fn test_account_ids_are_quoted() {
        let actual = dump(json!({"account": "012345678901"}));
        assert_eq!(actual, "account: '012345678901'\n");
    }

    #[test]
    fn test_numeric_and_boolean_words_are_quoted() {
        let actual = dump(json!(["123", "1.5", "true", "no", "plain"]));
        assert_eq!(actual, "- '123'\n- '1.5'\n- 'true'\n- 'no'\n- plain\n");
    }

    #[test]
    fn test_plain_root_scalar_gets_end_marker() {
        assert_eq!(dump(json!("The cake is a lie")), "The cake is a lie\n...\n");
        assert_eq!(dump(json!("0123")), "'0123'\n");
    }

    #[test]
    fn test_sequences_indent_under_parent_key() {
        let actual = dump(json!({"Statement": [{"Effect": "Allow", "Action": ["s3:*"]}]}));
        assert_eq!(
            actual,
            "Statement:\n  - Effect: Allow\n    Action:\n      - s3:*\n"
        );
    }

    #[test]
    fn test_timestamp_emits_raw() {
        let value = Value::Map(crate::odict::ODict::from_pairs([(
            "at".to_string(),
            Value::Timestamp("2017-03-02 19:52:00".to_string()),
        )]));
        assert_eq!(
            dump_yaml(&value, &DumperOptions::default()),
            "at: 2017-03-02 19:52:00\n"
        );
    }

    #[test]
    fn test_date_like_string_stays_quoted() {
        let actual = dump(json!({"when": "2017-03-02"}));
        assert_eq!(actual, "when: '2017-03-02'\n");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(dump(json!({"a": {}, "b": []})), "a: {}\nb: []\n");
    }
}
