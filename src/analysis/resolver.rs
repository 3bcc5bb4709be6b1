// Usage resolver: classify declared project dependencies as used or unused

use crate::config::Config;
use crate::model::{Dependency, Module, PROJECT_ACCESSOR_PREFIX};
use rayon::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn camel_boundary() -> &'static Regex {
    static CAMEL_BOUNDARY: OnceLock<Regex> = OnceLock::new();
    CAMEL_BOUNDARY.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"))
}

/// Module name a dependency token refers to.
///
/// `projects.` is dropped and dots become colons. With `kebab_case` each
/// segment's camelCase is hyphenated and lowercased
/// (`library.vouchersUtil` -> `library:vouchers-util`).
pub fn to_module_name(dependency: &str, kebab_case: bool) -> String {
    let name = dependency
        .strip_prefix(PROJECT_ACCESSOR_PREFIX)
        .unwrap_or(dependency);

    name.split('.')
        .map(|part| {
            if kebab_case {
                camel_boundary().replace_all(part, "$1-$2").to_lowercase()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(":")
}

/// Cross-references every module's declarations against the others'
/// exposed classes
pub struct UsageResolver<'a> {
    config: &'a Config,
    modules: &'a [Module],
    exposed: HashMap<&'a str, HashSet<String>>,
}

impl<'a> UsageResolver<'a> {
    pub fn new(modules: &'a [Module], config: &'a Config) -> Self {
        // Class names compare case-insensitively
        let exposed = modules
            .iter()
            .map(|m| {
                let classes = m.exposed_classes.iter().map(|c| c.to_lowercase()).collect();
                (m.name.as_str(), classes)
            })
            .collect();

        Self {
            config,
            modules,
            exposed,
        }
    }

    /// The scanned module a dependency points at, if any
    pub fn target_of(&self, dependency: &Dependency) -> Option<&'a Module> {
        let kebab = to_module_name(&dependency.name, true);
        let verbatim = to_module_name(&dependency.name, false);
        self.modules
            .iter()
            .find(|m| m.name == kebab || m.name == verbatim)
    }

    /// Unused dependencies of `module`, in declaration order
    pub fn unused_dependencies(&self, module: &Module) -> Vec<Dependency> {
        let referenced: HashSet<String> = module
            .referenced_classes
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        module
            .dependencies
            .par_iter()
            .filter(|dependency| !self.is_used(module, dependency, &referenced))
            .cloned()
            .collect()
    }

    fn is_used(&self, module: &Module, dependency: &Dependency, referenced: &HashSet<String>) -> bool {
        if self.config.is_dependency_excluded(&module.name, dependency) {
            debug!("{}: {} is excluded", module.name, dependency);
            return true;
        }

        if dependency.is_external() {
            return true;
        }

        let Some(target) = self.target_of(dependency) else {
            // Not a project module: external coordinates are out of scope
            return true;
        };

        self.exposed
            .get(target.name.as_str())
            .is_some_and(|exposed| !exposed.is_disjoint(referenced))
    }
}

/// Assign the unused dependencies of every module.
///
/// Every module is resolved against the full set, so the input must contain
/// all scanned modules, not just the ones being reported.
pub fn resolve_usage(modules: Vec<Module>, config: &Config) -> Vec<Module> {
    let unused: Vec<Vec<Dependency>> = {
        let resolver = UsageResolver::new(&modules, config);
        modules
            .par_iter()
            .map(|module| resolver.unused_dependencies(module))
            .collect()
    };

    modules
        .into_iter()
        .zip(unused)
        .map(|(module, unused)| module.with_unused_dependencies(unused))
        .collect()
}

/// Keep only `target` when one is given.
///
/// An unknown target yields nothing.
pub fn filter_target(modules: Vec<Module>, target: Option<&str>) -> Vec<Module> {
    let Some(target) = target else {
        return modules;
    };
    let target = target.trim_start_matches(':');

    let filtered: Vec<Module> = modules.into_iter().filter(|m| m.name == target).collect();
    if filtered.is_empty() {
        warn!("Module '{}' not found in settings.gradle", target);
    }
    filtered
}
