//! Convert CloudFormation templates between JSON and YAML.
//!
//! The document model keeps mapping keys in their source order, the YAML
//! codec speaks the `!Ref` style short-form intrinsic tags, and an
//! optional cleanup pass rewrites `Fn::Join` into the more readable
//! `Fn::Sub`.
//!
//! ```no_run
//! let template = r#"{"Resources": {"Bucket": {"Type": "AWS::S3::Bucket"}}}"#;
//! let yaml = cfn_flip::flip(template, None, None, false, false, false)?;
//! # Ok::<(), cfn_flip::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

mod cfn_yaml;
mod clean;
mod config;
mod error;
mod json;
mod literal;
mod odict;
mod value;

pub use cfn_yaml::{dump_yaml, load_yaml, DumperOptions};
pub use clean::clean;
pub use config::{Config, CONFIG, MAX_COL_WIDTH_VAR};
pub use error::{Error, Result};
pub use json::{dump_json, load_json};
pub use literal::preserve_literals;
pub use odict::ODict;
pub use value::Value;

/// A template serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn opposite(self) -> Format {
        match self {
            Format::Json => Format::Yaml,
            Format::Yaml => Format::Json,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(format!("Unknown format: {}", other)),
        }
    }
}

/// Parse a template, guessing the format. JSON is tried first since all
/// JSON is also valid YAML.
pub fn load(template: &str) -> Result<(Value, Format)> {
    if let Ok(data) = load_json(template) {
        return Ok((data, Format::Json));
    }
    match load_yaml(template) {
        Ok(data) => Ok((data, Format::Yaml)),
        Err(_) => Err(Error::UnknownFormat),
    }
}

/// Convert a YAML template to JSON.
pub fn to_json(template: &str, clean_up: bool) -> Result<String> {
    let mut data = load_yaml(template)?;

    if clean_up {
        data = clean(data);
    }

    Ok(dump_json(&data))
}

/// Convert a JSON template to YAML.
pub fn to_yaml(template: &str, clean_up: bool, long_form: bool) -> Result<String> {
    let mut data = load_json(template)?;

    if clean_up {
        data = clean(data);
    }

    Ok(render_yaml(data, clean_up, long_form))
}

fn render_yaml(data: Value, clean_up: bool, long_form: bool) -> String {
    let data = preserve_literals(data);
    let opts = DumperOptions {
        clean_up,
        long_form,
        ..DumperOptions::default()
    };
    dump_yaml(&data, &opts)
}

/// Convert a template between JSON and YAML.
///
/// When neither format is given, the input format is detected and the
/// output is the opposite. An explicit output format implies the
/// opposite input format, and `no_flip` makes the two formats equal,
/// turning the conversion into a normalizing reformat.
pub fn flip(
    template: &str,
    in_format: Option<Format>,
    out_format: Option<Format>,
    clean_up: bool,
    no_flip: bool,
    long_form: bool,
) -> Result<String> {
    let in_format = in_format.or_else(|| {
        if no_flip {
            out_format
        } else {
            out_format.map(Format::opposite)
        }
    });

    let (mut data, in_format) = match in_format {
        Some(Format::Json) => (load_json(template)?, Format::Json),
        Some(Format::Yaml) => (load_yaml(template)?, Format::Yaml),
        None => load(template)?,
    };

    let out_format = out_format.unwrap_or(if no_flip {
        in_format
    } else {
        in_format.opposite()
    });

    if clean_up {
        data = clean(data);
    }

    match out_format {
        Format::Json => Ok(dump_json(&data)),
        Format::Yaml => Ok(render_yaml(data, clean_up, long_form)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_detects_format() {
        let (_, format) = load("{\"a\": 1}").unwrap();
        assert_eq!(format, Format::Json);

        let (_, format) = load("a: !Ref Cake\n").unwrap();
        assert_eq!(format, Format::Yaml);

        let err = load("{not: valid: anything [").unwrap_err();
        assert_eq!(err.to_string(), "Could not determine the input format");
    }

    #[test]
    fn test_flip_json_to_yaml() {
        let actual = flip("{\"a\": {\"Ref\": \"Cake\"}}", None, None, false, false, false).unwrap();

        assert_eq!(actual, "a: !Ref 'Cake'\n");
    }

    #[test]
    fn test_flip_yaml_to_json() {
        let actual = flip("a: !Ref Cake\n", None, None, false, false, false).unwrap();

        assert_eq!(actual, "{\n    \"a\": {\n        \"Ref\": \"Cake\"\n    }\n}");
    }

    #[test]
    fn test_no_flip_reformats() {
        let actual = flip("{\"z\": 1, \"a\": 2}", None, None, false, true, false).unwrap();

        assert_eq!(actual, "{\n    \"z\": 1,\n    \"a\": 2\n}");
    }

    #[test]
    fn test_explicit_output_implies_opposite_input() {
        // Valid JSON, but out=json forces the YAML loader; JSON is valid
        // YAML, so this still parses and reformats.
        let actual = flip(
            "{\"a\": \"b\"}",
            None,
            Some(Format::Json),
            false,
            false,
            false,
        )
        .unwrap();

        assert_eq!(actual, "{\n    \"a\": \"b\"\n}");
    }

    #[test]
    fn test_explicit_input_format_errors_propagate() {
        let err = flip("a: !Ref Cake\n", Some(Format::Json), None, false, false, false)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidJson(_)));
    }

    #[test]
    fn test_flip_with_clean() {
        let template = "{\"a\": {\"Fn::Join\": [\" \", [\"Hello\", {\"Ref\": \"Cake\"}]]}}";

        let actual = flip(template, None, None, true, false, false).unwrap();

        assert_eq!(actual, "a: !Sub 'Hello ${Cake}'\n");
    }

    #[test]
    fn test_flip_with_long_form() {
        let actual = flip("{\"a\": {\"Ref\": \"Cake\"}}", None, None, false, false, true).unwrap();

        assert_eq!(actual, "a:\n  Ref: Cake\n");
    }

    #[test]
    fn test_flip_dates_survive() {
        let actual = flip("Expire: 2012-10-17\n", None, None, false, false, false).unwrap();

        assert_eq!(actual, "{\n    \"Expire\": \"2012-10-17\"\n}");
    }

    #[test]
    fn test_flip_state_machine_definition_to_literal() {
        let template = concat!(
            "{\"Machine\": {",
            "\"Type\": \"AWS::StepFunctions::StateMachine\", ",
            "\"Properties\": {\"DefinitionString\": {\"StartAt\": \"Go\"}}}}"
        );

        let actual = flip(template, None, None, false, false, false).unwrap();

        assert_eq!(
            actual,
            concat!(
                "Machine:\n",
                "  Type: AWS::StepFunctions::StateMachine\n",
                "  Properties:\n",
                "    DefinitionString: |-\n",
                "      {\n",
                "          \"StartAt\": \"Go\"\n",
                "      }\n",
            )
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("YAML".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
        assert!("toml".parse::<Format>().is_err());
        assert_eq!(Format::Json.opposite(), Format::Yaml);
        assert_eq!(Format::Yaml.to_string(), "yaml");
    }
}
