use crate::model::{is_declaration_line, Dependency};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Build file edit failures
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Build file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("Dependency not found in build file {path}: {dependency}")]
    NotFound { dependency: String, path: PathBuf },

    #[error("No backup file found: {0}")]
    MissingBackup(PathBuf),

    #[error("Backup file already exists, restore or delete it first: {0}")]
    BackupExists(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EditError + '_ {
    move |source| EditError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Line-level editor for one module build file, with a sibling
/// `<file>.backup` used to undo edits
#[derive(Debug, Clone)]
pub struct BuildFileEditor {
    build_file: PathBuf,
    backup_file: PathBuf,
}

impl BuildFileEditor {
    pub fn new(build_file: impl Into<PathBuf>) -> Self {
        let build_file = build_file.into();
        let mut backup = build_file.clone().into_os_string();
        backup.push(".backup");
        Self {
            build_file,
            backup_file: PathBuf::from(backup),
        }
    }

    pub fn build_file(&self) -> &Path {
        &self.build_file
    }

    pub fn backup_file(&self) -> &Path {
        &self.backup_file
    }

    pub fn has_backup(&self) -> bool {
        self.backup_file.exists()
    }

    fn read(&self) -> Result<String, EditError> {
        if !self.build_file.is_file() {
            return Err(EditError::MissingFile(self.build_file.clone()));
        }
        std::fs::read_to_string(&self.build_file).map_err(io_error(&self.build_file))
    }

    fn write(&self, lines: &[&str]) -> Result<(), EditError> {
        std::fs::write(&self.build_file, lines.join("\n")).map_err(io_error(&self.build_file))
    }

    /// Drop repeated declaration lines, keeping each first occurrence.
    ///
    /// Returns how many lines were removed.
    pub fn deduplicate(&self) -> Result<usize, EditError> {
        let contents = self.read()?;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut kept: Vec<&str> = Vec::new();
        let mut removed = 0;

        for line in contents.split('\n') {
            let trimmed = line.trim();
            if is_declaration_line(trimmed) && !seen.insert(trimmed) {
                info!("Removing duplicated dependency: {}", trimmed);
                removed += 1;
                continue;
            }
            kept.push(line);
        }

        if removed > 0 {
            self.write(&kept)?;
        }
        Ok(removed)
    }

    /// Delete the first declaration line mentioning `dependency`.
    ///
    /// `dependency` is either a bare name or the `"<kind> <name>"` form; only
    /// the part after the first space is matched.
    pub fn remove_dependency(&self, dependency: &str) -> Result<(), EditError> {
        let contents = self.read()?;
        let needle = dependency
            .split_once(' ')
            .map_or(dependency, |(_, name)| name)
            .trim();

        let mut lines: Vec<&str> = contents.split('\n').collect();
        let Some(index) = lines
            .iter()
            .position(|line| is_matching_line(line.trim(), needle))
        else {
            warn!("Dependency not found in build file: {}", dependency);
            return Err(EditError::NotFound {
                dependency: dependency.to_string(),
                path: self.build_file.clone(),
            });
        };

        let line = lines.remove(index);
        debug!("Removed dependency line: {}", line.trim());
        self.write(&lines)
    }

    /// Delete the declaration of `dependency`
    pub fn remove(&self, dependency: &Dependency) -> Result<(), EditError> {
        self.remove_dependency(&dependency.to_string())
    }

    /// Copy the build file to its backup.
    ///
    /// Refuses when a backup is already present: it may be the only clean
    /// copy left by an interrupted run.
    pub fn create_backup(&self) -> Result<(), EditError> {
        if !self.build_file.is_file() {
            return Err(EditError::MissingFile(self.build_file.clone()));
        }
        if self.backup_file.exists() {
            return Err(EditError::BackupExists(self.backup_file.clone()));
        }
        std::fs::copy(&self.build_file, &self.backup_file)
            .map(|_| ())
            .map_err(io_error(&self.backup_file))
    }

    /// Put the backup back in place and delete it
    pub fn restore_from_backup(&self) -> Result<(), EditError> {
        if !self.backup_file.is_file() {
            return Err(EditError::MissingBackup(self.backup_file.clone()));
        }
        std::fs::copy(&self.backup_file, &self.build_file).map_err(io_error(&self.build_file))?;
        std::fs::remove_file(&self.backup_file).map_err(io_error(&self.backup_file))
    }

    /// Delete the backup, keeping the current build file
    pub fn cleanup_backup(&self) -> Result<(), EditError> {
        if !self.backup_file.exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.backup_file).map_err(io_error(&self.backup_file))
    }
}

fn is_matching_line(trimmed: &str, needle: &str) -> bool {
    !needle.is_empty() && is_declaration_line(trimmed) && trimmed.contains(needle)
}
