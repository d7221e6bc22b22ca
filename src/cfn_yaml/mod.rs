//! CloudFormation YAML codec: a loader that understands the `!Ref` style
//! short-form intrinsic function tags, and an emitter that produces them.

mod dumper;
mod loader;
pub(crate) mod mappings;

pub use dumper::{dump_yaml, DumperOptions};
pub use loader::load_yaml;
