use super::Dependency;
use std::collections::HashSet;
use std::path::PathBuf;

/// One Gradle module with its declared dependencies and class usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Hierarchical project path without the leading colon, e.g. `library:core`
    pub name: String,

    /// Declared dependencies in build file order
    pub dependencies: Vec<Dependency>,

    /// Every class referenced from this module's compiled output
    pub referenced_classes: HashSet<String>,

    /// Classes compiled by this module that are visible outside it
    pub exposed_classes: HashSet<String>,

    /// Assigned by usage resolution
    unused: Option<Vec<Dependency>>,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        dependencies: Vec<Dependency>,
        referenced_classes: HashSet<String>,
        exposed_classes: HashSet<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dependencies,
            referenced_classes,
            exposed_classes,
            unused: None,
        }
    }

    /// Relative directory of the module (`library:core` -> `library/core`)
    pub fn relative_path(&self) -> PathBuf {
        module_dir(&self.name)
    }

    /// Dependencies classified as unused; empty until resolved
    pub fn unused_dependencies(&self) -> &[Dependency] {
        self.unused.as_deref().unwrap_or(&[])
    }

    pub fn is_resolved(&self) -> bool {
        self.unused.is_some()
    }

    /// Attach the resolved unused dependencies, replacing any earlier
    /// resolution.
    ///
    /// Every entry must be one of `dependencies`; anything else is dropped.
    pub fn with_unused_dependencies(mut self, unused: Vec<Dependency>) -> Self {
        let unused = unused
            .into_iter()
            .filter(|dep| self.dependencies.contains(dep))
            .collect();
        self.unused = Some(unused);
        self
    }
}

/// Relative directory for a module name
pub fn module_dir(name: &str) -> PathBuf {
    name.split(':').filter(|s| !s.is_empty()).collect()
}
