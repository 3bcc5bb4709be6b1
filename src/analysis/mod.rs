//! Usage analysis: scan every module, then classify each declared project
//! dependency against the classes its target exposes.

mod resolver;
mod scanner;

pub use resolver::{filter_target, resolve_usage, to_module_name, UsageResolver};
pub use scanner::{scan_module, ModuleScanner};

use crate::config::Config;
use crate::discovery::read_module_names;
use crate::model::Module;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

/// Options for one analysis run
#[derive(Debug, Default, Clone)]
pub struct AnalysisOptions {
    /// Report only this module; analysis still covers every module
    pub target_module: Option<String>,

    /// Show a progress bar while scanning
    pub progress: bool,
}

/// Discover, scan and resolve every module of a project.
///
/// Returns an empty list when the project has no settings file.
pub fn analyze_project(project_root: &Path, config: &Config, options: &AnalysisOptions) -> Vec<Module> {
    let Some(names) = read_module_names(project_root) else {
        return Vec::new();
    };

    let names: Vec<String> = names
        .into_iter()
        .filter(|name| {
            let excluded = config.is_module_excluded(name);
            if excluded {
                debug!("Skipping excluded module {}", name);
            }
            !excluded
        })
        .collect();

    let mut scanner = ModuleScanner::new(project_root);
    if options.progress {
        let pb = ProgressBar::new(names.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} modules")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        scanner = scanner.with_progress(pb);
    }
    let modules = scanner.scan_all(&names);

    info!("Resolving dependency usage...");
    let modules = resolve_usage(modules, config);
    filter_target(modules, options.target_module.as_deref())
}
