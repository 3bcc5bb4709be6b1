use crate::model::Dependency;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File names searched in the project root, first found wins
pub const DEFAULT_CONFIG_NAMES: [&str; 6] = [
    "dependency-analyser-config.yml",
    ".depprune.yml",
    ".depprune.yaml",
    ".depprune.toml",
    "depprune.yml",
    "depprune.toml",
];

/// Substituted with the module name in quick check task templates
pub const MODULE_PLACEHOLDER: &str = "{module}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for dependency analysis and cleanup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Modules left out of analysis entirely
    pub excluded_modules: BTreeSet<String>,

    /// Per-module dependencies never reported as unused.
    ///
    /// Entries are either a bare name (`library-core`) or the display form
    /// (`implementation library-core`).
    pub excluded_dependencies: BTreeMap<String, BTreeSet<String>>,

    /// How the build is invoked to validate removals
    pub oracle: OracleConfig,
}

/// Build tool invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OracleConfig {
    /// Build tool executable, relative to the project root or on PATH
    pub command: String,

    /// Tasks run once after all removals
    pub full_tasks: Vec<String>,

    /// Tasks run after each removal attempt; `{module}` is substituted
    pub quick_tasks: Vec<String>,

    /// Flags appended after the task list
    pub flags: Vec<String>,

    /// How long to wait for output capture after the build exits
    pub join_timeout_ms: u64,

    /// Kill the build after this many seconds
    pub build_timeout_secs: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            command: "./gradlew".to_string(),
            full_tasks: vec!["assembleDebug".to_string(), "testDebugUnitTest".to_string()],
            quick_tasks: vec![
                ":{module}:assembleDebug".to_string(),
                ":{module}:compileDebugUnitTestKotlin".to_string(),
            ],
            flags: vec!["--quiet".to_string(), "--no-configuration-cache".to_string()],
            join_timeout_ms: 5000,
            build_timeout_secs: None,
        }
    }
}

impl OracleConfig {
    /// Quick check task list for one module
    pub fn quick_tasks_for(&self, module: &str) -> Vec<String> {
        self.quick_tasks
            .iter()
            .map(|task| task.replace(MODULE_PLACEHOLDER, module))
            .collect()
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parse_yaml = |contents: &str| -> Result<Config, ConfigError> {
            // An empty YAML document is an empty config
            if contents.trim().is_empty() {
                return Ok(Config::default());
            }
            serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        };
        let parse_toml = |contents: &str| -> Result<Config, ConfigError> {
            toml::from_str(contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        };

        match extension {
            "yml" | "yaml" => parse_yaml(&contents),
            "toml" => parse_toml(&contents),
            // Try YAML first, then TOML
            _ => parse_yaml(&contents).or_else(|_| parse_toml(&contents)),
        }
    }

    /// Load from the first default location in `project_root`.
    ///
    /// A missing or unreadable file degrades to the default configuration.
    pub fn from_default_locations(project_root: &Path) -> Self {
        let Some(path) = DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
        else {
            debug!("No config file in {}, using defaults", project_root.display());
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }

    pub fn is_module_excluded(&self, module: &str) -> bool {
        self.excluded_modules.contains(module)
            || self
                .excluded_modules
                .iter()
                .any(|m| m.trim_start_matches(':') == module)
    }

    /// Whether `dependency` is pinned as used for `module`
    pub fn is_dependency_excluded(&self, module: &str, dependency: &Dependency) -> bool {
        let display = dependency.to_string();
        self.excluded_dependencies
            .iter()
            .filter(|(name, _)| name.trim_start_matches(':') == module)
            .flat_map(|(_, entries)| entries)
            .any(|entry| {
                let entry = entry.trim();
                entry == dependency.name || entry == display
            })
    }
}
