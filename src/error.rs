use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the template transcoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The input is not well-formed JSON.
    InvalidJson(String),
    /// The input is not well-formed YAML, or uses a tag construct
    /// the loader cannot interpret.
    InvalidYaml(String),
    /// Format auto-detection failed: the input is neither JSON nor YAML.
    UnknownFormat,
    /// An ordered mapping was constructed from an unordered source.
    InvalidConstruction,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            Error::InvalidYaml(msg) => write!(f, "Invalid YAML: {}", msg),
            Error::UnknownFormat => write!(f, "Could not determine the input format"),
            Error::InvalidConstruction => {
                write!(f, "ODict does not allow construction from an unordered map")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidJson(err.to_string())
    }
}

impl From<serde_yml::Error> for Error {
    fn from(err: serde_yml::Error) -> Self {
        Error::InvalidYaml(err.to_string())
    }
}
