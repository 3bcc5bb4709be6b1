//! depprune - Find and safely remove unused module dependencies in Gradle
//! projects (Kotlin/Java)
//!
//! Usage is decided from compiled class files, never from source text, and
//! every removal is validated by rebuilding the affected module.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **Discovery** - Read the module list from `settings.gradle(.kts)`
//! 2. **Scanning** - Parse each module's build file and class files in parallel
//! 3. **Resolution** - Classify each declared project dependency as used or unused
//! 4. **Reporting** - Terminal, text file and JSON reports
//! 5. **Cleanup** - Remove unused declarations, keeping only edits the build confirms

pub mod analysis;
pub mod bytecode;
pub mod config;
pub mod discovery;
pub mod model;
pub mod oracle;
pub mod refactor;
pub mod report;

pub use analysis::{analyze_project, resolve_usage, scan_module, AnalysisOptions, ModuleScanner, UsageResolver};
pub use bytecode::{extract_references, is_visible_class, ClassFileError, ClassSummary};
pub use config::{Config, OracleConfig};
pub use model::{Dependency, DependencyKind, Module};
pub use oracle::{BuildOracle, BuildOutcome, GradleOracle};
pub use refactor::{BuildFileEditor, CleanupRecord, CleanupSummary, CleanupTarget, EditError, RemovalEngine};
pub use report::{ReportFormat, Reporter};
