//! Validated removal of unused dependencies.
//!
//! Every edit happens inside a backup/restore envelope and is kept only if
//! the module still compiles. Small candidate sets are tried one by one;
//! larger ones are removed as a batch and bisected on failure.

use super::editor::BuildFileEditor;
use crate::discovery::ModuleLayout;
use crate::model::{Dependency, Module};
use crate::oracle::{BuildOracle, BuildOutcome};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Candidate counts up to this are tried one at a time
pub const SEQUENTIAL_LIMIT: usize = 3;

pub const REASON_REMOVED: &str = "Successfully removed";
pub const REASON_REMOVED_BATCH: &str = "Successfully removed (batch)";
pub const REASON_BUILD_FAILED: &str = "Build validation failed";
pub const REASON_REMOVE_FAILED: &str = "Failed to remove from build file";
pub const REASON_BACKUP_FAILED: &str = "Failed to create backup";
pub const REASON_NO_BUILD_FILE: &str = "No build file found";
pub const REASON_RESTORE_FAILED: &str = "Failed to restore from backup";

/// How far one removal attempt got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptState {
    Untested,
    BackedUp,
    Removed,
    Validating,
    Confirmed,
    RolledBack,
}

impl AttemptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptState::Untested => "untested",
            AttemptState::BackedUp => "backed-up",
            AttemptState::Removed => "removed",
            AttemptState::Validating => "validating",
            AttemptState::Confirmed => "confirmed",
            AttemptState::RolledBack => "rolled-back",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of trying to remove one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRecord {
    pub dependency: Dependency,
    pub module: String,
    pub removed: bool,
    pub reason: String,
    pub build_confirmed: bool,
    pub state: AttemptState,
}

impl CleanupRecord {
    fn confirmed(module: &str, dependency: &Dependency, reason: &str) -> Self {
        Self {
            dependency: dependency.clone(),
            module: module.to_string(),
            removed: true,
            reason: reason.to_string(),
            build_confirmed: true,
            state: AttemptState::Confirmed,
        }
    }

    fn failed(module: &str, dependency: &Dependency, reason: &str, state: AttemptState) -> Self {
        Self {
            dependency: dependency.clone(),
            module: module.to_string(),
            removed: false,
            reason: reason.to_string(),
            build_confirmed: false,
            state,
        }
    }
}

/// Dependencies to try removing from one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTarget {
    pub module: String,
    pub dependencies: Vec<Dependency>,
}

impl CleanupTarget {
    pub fn new(module: impl Into<String>, dependencies: Vec<Dependency>) -> Self {
        Self {
            module: module.into(),
            dependencies,
        }
    }
}

impl From<&Module> for CleanupTarget {
    fn from(module: &Module) -> Self {
        Self::new(module.name.clone(), module.unused_dependencies().to_vec())
    }
}

/// Strategy for a candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    Sequential,
    Bisection,
}

impl RemovalMode {
    pub fn for_count(count: usize) -> Self {
        if count <= SEQUENTIAL_LIMIT {
            RemovalMode::Sequential
        } else {
            RemovalMode::Bisection
        }
    }
}

impl fmt::Display for RemovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalMode::Sequential => f.write_str("sequential"),
            RemovalMode::Bisection => f.write_str("bisection"),
        }
    }
}

/// What a cleanup run would do for one module, without doing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRemoval {
    pub module: String,
    pub mode: RemovalMode,
    pub dependencies: Vec<Dependency>,
    pub has_build_file: bool,
}

/// All records of a cleanup run plus the final full build
#[derive(Debug, Clone, Default)]
pub struct CleanupSummary {
    pub records: Vec<CleanupRecord>,
    pub final_validation: Option<BuildOutcome>,
    pub quick_checks: usize,
}

impl CleanupSummary {
    /// Latest record per (module, dependency), in first-seen order
    pub fn latest_records(&self) -> Vec<&CleanupRecord> {
        let mut order: Vec<(&str, &Dependency)> = Vec::new();
        let mut latest: BTreeMap<(&str, &Dependency), &CleanupRecord> = BTreeMap::new();
        for record in &self.records {
            let key = (record.module.as_str(), &record.dependency);
            if latest.insert(key, record).is_none() {
                order.push(key);
            }
        }
        order.iter().filter_map(|key| latest.get(key).copied()).collect()
    }

    pub fn removed(&self) -> Vec<&CleanupRecord> {
        self.latest_records().into_iter().filter(|r| r.removed).collect()
    }

    pub fn failed(&self) -> Vec<&CleanupRecord> {
        self.latest_records().into_iter().filter(|r| !r.removed).collect()
    }

    /// Records grouped by module, modules sorted by name
    pub fn by_module<'a>(records: &[&'a CleanupRecord]) -> BTreeMap<&'a str, Vec<&'a CleanupRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&CleanupRecord>> = BTreeMap::new();
        for &record in records {
            grouped.entry(record.module.as_str()).or_default().push(record);
        }
        grouped
    }

    pub fn final_build_failed(&self) -> bool {
        self.final_validation.as_ref().is_some_and(|outcome| !outcome.succeeded)
    }
}

/// Removes dependencies from module build files, keeping only edits the
/// oracle confirms
pub struct RemovalEngine<'a, O: BuildOracle> {
    project_root: &'a Path,
    oracle: O,
}

impl<'a, O: BuildOracle> RemovalEngine<'a, O> {
    pub fn new(project_root: &'a Path, oracle: O) -> Self {
        Self {
            project_root,
            oracle,
        }
    }

    /// Describe each target's mode without touching any file
    pub fn plan(&self, targets: &[CleanupTarget]) -> Vec<PlannedRemoval> {
        targets
            .iter()
            .filter(|target| !target.dependencies.is_empty())
            .map(|target| PlannedRemoval {
                module: target.module.clone(),
                mode: RemovalMode::for_count(target.dependencies.len()),
                dependencies: target.dependencies.clone(),
                has_build_file: ModuleLayout::new(self.project_root, &target.module)
                    .build_file()
                    .is_some(),
            })
            .collect()
    }

    /// Clean every target in order, then run the full build once if
    /// anything was removed
    pub fn apply_removal(&self, targets: &[CleanupTarget]) -> CleanupSummary {
        let mut summary = CleanupSummary::default();

        for target in targets.iter().filter(|t| !t.dependencies.is_empty()) {
            let mut run = ModuleRun {
                oracle: &self.oracle,
                module: &target.module,
                records: Vec::new(),
                quick_checks: 0,
            };
            run.clean(self.project_root, &target.dependencies);
            summary.quick_checks += run.quick_checks;
            summary.records.extend(run.records);
        }

        if summary.records.iter().any(|r| r.removed) {
            info!("Validating full build...");
            let outcome = self.oracle.validate_full_build();
            if outcome.succeeded {
                info!("Full build validation passed");
            } else {
                error!(
                    "Full build validation failed (exit code {}); confirmed removals were kept",
                    outcome.exit_code
                );
            }
            summary.final_validation = Some(outcome);
        }

        summary
    }
}

/// Cleanup state for a single module
struct ModuleRun<'r, O: BuildOracle> {
    oracle: &'r O,
    module: &'r str,
    records: Vec<CleanupRecord>,
    quick_checks: usize,
}

impl<'r, O: BuildOracle> ModuleRun<'r, O> {
    fn clean(&mut self, project_root: &Path, dependencies: &[Dependency]) {
        let layout = ModuleLayout::new(project_root, self.module);
        let Some(build_file) = layout.build_file() else {
            warn!("{}: no build file found", self.module);
            for dependency in dependencies {
                self.fail(dependency, REASON_NO_BUILD_FILE, AttemptState::Untested);
            }
            return;
        };

        let editor = BuildFileEditor::new(build_file);
        match editor.deduplicate() {
            Ok(0) => {}
            Ok(n) => info!("{}: removed {} duplicated declarations", self.module, n),
            Err(e) => warn!("{}: deduplication failed: {}", self.module, e),
        }

        info!(
            "{}: {} candidates ({} mode)",
            self.module,
            dependencies.len(),
            RemovalMode::for_count(dependencies.len())
        );
        self.dispatch(&editor, dependencies);
    }

    fn dispatch(&mut self, editor: &BuildFileEditor, dependencies: &[Dependency]) {
        match RemovalMode::for_count(dependencies.len()) {
            RemovalMode::Sequential => self.sequential(editor, dependencies),
            RemovalMode::Bisection => self.bisect(editor, dependencies),
        }
    }

    fn check(&mut self) -> bool {
        self.quick_checks += 1;
        self.oracle.quick_compile_check(self.module).succeeded
    }

    fn confirm(&mut self, dependency: &Dependency, reason: &str) {
        info!("{}: removed {}", self.module, dependency);
        self.records
            .push(CleanupRecord::confirmed(self.module, dependency, reason));
    }

    fn fail(&mut self, dependency: &Dependency, reason: &str, state: AttemptState) {
        debug!("{}: kept {} ({})", self.module, dependency, reason);
        self.records
            .push(CleanupRecord::failed(self.module, dependency, reason, state));
    }

    /// Restore after an unsuccessful edit; false if the restore failed
    fn restore(&self, editor: &BuildFileEditor) -> bool {
        match editor.restore_from_backup() {
            Ok(()) => true,
            Err(e) => {
                error!("{}: failed to restore build file: {}", self.module, e);
                false
            }
        }
    }

    fn sequential(&mut self, editor: &BuildFileEditor, dependencies: &[Dependency]) {
        for dependency in dependencies {
            self.attempt_one(editor, dependency);
        }
    }

    fn attempt_one(&mut self, editor: &BuildFileEditor, dependency: &Dependency) {
        if let Err(e) = editor.create_backup() {
            warn!("{}: {}", self.module, e);
            self.fail(dependency, REASON_BACKUP_FAILED, AttemptState::Untested);
            return;
        }

        if let Err(e) = editor.remove(dependency) {
            debug!("{}: {}", self.module, e);
            let state = if self.restore(editor) {
                AttemptState::BackedUp
            } else {
                AttemptState::Removed
            };
            self.fail(dependency, REASON_REMOVE_FAILED, state);
            return;
        }

        if self.check() {
            if let Err(e) = editor.cleanup_backup() {
                warn!("{}: {}", self.module, e);
            }
            self.confirm(dependency, REASON_REMOVED);
        } else if self.restore(editor) {
            self.fail(dependency, REASON_BUILD_FAILED, AttemptState::RolledBack);
        } else {
            self.fail(dependency, REASON_RESTORE_FAILED, AttemptState::Validating);
        }
    }

    fn bisect(&mut self, editor: &BuildFileEditor, dependencies: &[Dependency]) {
        if dependencies.len() <= 1 {
            self.sequential(editor, dependencies);
            return;
        }

        if let Err(e) = editor.create_backup() {
            warn!("{}: {}", self.module, e);
            for dependency in dependencies {
                self.fail(dependency, REASON_BACKUP_FAILED, AttemptState::Untested);
            }
            return;
        }

        let (removable, unremovable): (Vec<&Dependency>, Vec<&Dependency>) =
            dependencies.iter().partition(|dep| editor.remove(dep).is_ok());

        if !unremovable.is_empty() {
            let restored = self.restore(editor);
            for dependency in unremovable {
                let state = if restored {
                    AttemptState::BackedUp
                } else {
                    AttemptState::Removed
                };
                self.fail(dependency, REASON_REMOVE_FAILED, state);
            }
            if !restored {
                for dependency in removable {
                    self.fail(dependency, REASON_RESTORE_FAILED, AttemptState::Removed);
                }
                return;
            }
            let remainder: Vec<Dependency> = removable.into_iter().cloned().collect();
            self.dispatch(editor, &remainder);
            return;
        }

        debug!("{}: validating batch of {}", self.module, dependencies.len());
        if self.check() {
            if let Err(e) = editor.cleanup_backup() {
                warn!("{}: {}", self.module, e);
            }
            for dependency in dependencies {
                self.confirm(dependency, REASON_REMOVED_BATCH);
            }
            return;
        }

        if !self.restore(editor) {
            for dependency in dependencies {
                self.fail(dependency, REASON_RESTORE_FAILED, AttemptState::Validating);
            }
            return;
        }

        let (left, right) = dependencies.split_at(dependencies.len() / 2);
        self.bisect(editor, left);
        self.bisect(editor, right);
    }
}
