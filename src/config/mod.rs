//! Analyser configuration: module and dependency exclusions plus the build
//! oracle's command line.

mod loader;

pub use loader::{Config, ConfigError, OracleConfig, DEFAULT_CONFIG_NAMES, MODULE_PLACEHOLDER};
