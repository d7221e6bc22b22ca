use lazy_static::lazy_static;
use std::env;

/// Environment variable that overrides the output column width.
pub const MAX_COL_WIDTH_VAR: &str = "CFN_MAX_COL_WIDTH";

const DEFAULT_MAX_COL_WIDTH: usize = 120;

lazy_static! {
    /// Process-wide defaults, read from the environment once.
    pub static ref CONFIG: Config = Config::from_env();
}

/// Tunables consumed by the YAML dumper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum output column width. Strings whose lines exceed this are
    /// not eligible for literal block style in clean output.
    pub max_col_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_col_width: DEFAULT_MAX_COL_WIDTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let max_col_width = env::var(MAX_COL_WIDTH_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_COL_WIDTH);

        Config { max_col_width }
    }
}
