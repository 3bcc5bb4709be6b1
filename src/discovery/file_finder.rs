use crate::model::module_dir;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Build file names, checked in order
pub const BUILD_FILES: [&str; 2] = ["build.gradle", "build.gradle.kts"];

/// What a compiled output directory contributes to a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassRole {
    /// Classes whose references count as usage by the module
    Referenced,
    /// Classes the module makes available to its dependents
    Exposed,
}

/// One compiled output directory under `<module>/build/`
#[derive(Debug, Clone, Copy)]
pub struct ClassDir {
    pub path: &'static str,
    pub referenced: bool,
    pub exposed: bool,
}

impl ClassDir {
    const fn new(path: &'static str, referenced: bool, exposed: bool) -> Self {
        Self {
            path,
            referenced,
            exposed,
        }
    }

    pub fn has_role(&self, role: ClassRole) -> bool {
        match role {
            ClassRole::Referenced => self.referenced,
            ClassRole::Exposed => self.exposed,
        }
    }
}

/// Compiled output locations of Java, Kotlin JVM and Android modules
pub const CLASS_DIRS: [ClassDir; 8] = [
    ClassDir::new("classes/java/main", true, true),
    ClassDir::new("classes/kotlin/main", true, true),
    ClassDir::new("tmp/kotlin-classes/debug", true, true),
    ClassDir::new("tmp/kotlin-classes/release", false, true),
    ClassDir::new("tmp/kotlin-classes/debugUnitTest", true, false),
    ClassDir::new("classes/java/test", true, false),
    ClassDir::new("classes/kotlin/test", true, false),
    ClassDir::new("intermediates/javac/debug/classes", true, true),
];

/// On-disk layout of one module inside a project
#[derive(Debug, Clone)]
pub struct ModuleLayout {
    name: String,
    dir: PathBuf,
}

impl ModuleLayout {
    pub fn new(project_root: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: project_root.join(module_dir(name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `build.gradle`, then `build.gradle.kts`
    pub fn build_file(&self) -> Option<PathBuf> {
        BUILD_FILES
            .iter()
            .map(|name| self.dir.join(name))
            .find(|path| path.is_file())
    }

    /// Existing output directories that carry `role`
    pub fn class_dirs(&self, role: ClassRole) -> Vec<PathBuf> {
        let build_dir = self.dir.join("build");
        CLASS_DIRS
            .iter()
            .filter(|dir| dir.has_role(role))
            .map(|dir| build_dir.join(dir.path))
            .filter(|path| path.is_dir())
            .collect()
    }

    /// Every `.class` file below the directories that carry `role`
    pub fn class_files(&self, role: ClassRole) -> Vec<PathBuf> {
        let files: Vec<PathBuf> = self
            .class_dirs(role)
            .iter()
            .flat_map(|dir| find_class_files(dir))
            .collect();
        debug!(
            "{}: {} {:?} class files",
            self.name,
            files.len(),
            role
        );
        files
    }
}

/// Recursively collect `.class` files; unreadable entries are skipped
pub fn find_class_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "class"))
        .map(|entry| {
            trace!("Found class file: {}", entry.path().display());
            entry.into_path()
        })
        .collect()
}
