// Module scanner: build file declarations plus compiled class usage

use crate::bytecode::ClassFile;
use crate::discovery::{ClassRole, ModuleLayout};
use crate::model::{parse_declarations, Dependency, Module};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What one class file contributes to its module
#[derive(Debug, Default)]
struct ClassFileScan {
    referenced: HashSet<String>,
    exposed: Option<String>,
}

/// Scans modules of one project, in parallel across modules and class files
pub struct ModuleScanner<'a> {
    project_root: &'a Path,
    progress: Option<ProgressBar>,
}

impl<'a> ModuleScanner<'a> {
    pub fn new(project_root: &'a Path) -> Self {
        Self {
            project_root,
            progress: None,
        }
    }

    /// Advance `progress` once per scanned module
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Scan every named module. Output order follows `names`.
    pub fn scan_all(&self, names: &[String]) -> Vec<Module> {
        info!("Scanning {} modules...", names.len());

        let modules: Vec<Module> = names
            .par_iter()
            .map(|name| {
                let module = self.scan(name);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                module
            })
            .collect();

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        modules
    }

    /// Scan a single module
    pub fn scan(&self, name: &str) -> Module {
        let layout = ModuleLayout::new(self.project_root, name);
        let dependencies = read_dependencies(&layout);
        let (referenced_classes, exposed_classes) = scan_classes(&layout);

        debug!(
            "{}: {} dependencies, {} referenced classes, {} exposed classes",
            name,
            dependencies.len(),
            referenced_classes.len(),
            exposed_classes.len()
        );

        Module::new(name, dependencies, referenced_classes, exposed_classes)
    }
}

/// Build a `Module` for `name` from the files under `project_root`
pub fn scan_module(project_root: &Path, name: &str) -> Module {
    ModuleScanner::new(project_root).scan(name)
}

fn read_dependencies(layout: &ModuleLayout) -> Vec<Dependency> {
    let Some(build_file) = layout.build_file() else {
        debug!("{}: no build file", layout.name());
        return Vec::new();
    };

    match std::fs::read_to_string(&build_file) {
        Ok(contents) => parse_declarations(&contents),
        Err(e) => {
            warn!("Failed to read {}: {}", build_file.display(), e);
            Vec::new()
        }
    }
}

fn scan_classes(layout: &ModuleLayout) -> (HashSet<String>, HashSet<String>) {
    // A directory may serve both roles; each file is parsed once
    let mut roles: HashMap<PathBuf, (bool, bool)> = HashMap::new();
    for path in layout.class_files(ClassRole::Referenced) {
        roles.entry(path).or_default().0 = true;
    }
    for path in layout.class_files(ClassRole::Exposed) {
        roles.entry(path).or_default().1 = true;
    }

    let scans: Vec<ClassFileScan> = roles
        .par_iter()
        .map(|(path, &(referenced, exposed))| scan_class_file(path, referenced, exposed))
        .collect();

    let mut referenced_classes = HashSet::new();
    let mut exposed_classes = HashSet::new();
    for scan in scans {
        referenced_classes.extend(scan.referenced);
        exposed_classes.extend(scan.exposed);
    }
    (referenced_classes, exposed_classes)
}

fn scan_class_file(path: &Path, referenced: bool, exposed: bool) -> ClassFileScan {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return ClassFileScan::default();
        }
    };

    let mut scan = ClassFileScan::default();
    match ClassFile::parse(&bytes) {
        Ok(class) => {
            if referenced {
                match class.referenced_classes() {
                    Ok(refs) => scan.referenced = refs,
                    Err(e) => warn!("Could not analyze {}: {}", path.display(), e),
                }
            }
            if exposed && class.is_visible() {
                scan.exposed = Some(class.binary_name());
            }
        }
        Err(e) => {
            warn!("Could not analyze {}: {}", path.display(), e);
            // The header alone still decides exposure
            if exposed {
                scan.exposed = ClassFile::parse_header(&bytes)
                    .ok()
                    .filter(|class| class.is_visible())
                    .map(|class| class.binary_name());
            }
        }
    }
    scan
}
