//! Build file refactoring: line-level edits with backups, and the engine
//! that keeps only the edits a build confirms.

mod editor;
pub mod removal;

pub use editor::{BuildFileEditor, EditError};
pub use removal::{
    AttemptState, CleanupRecord, CleanupSummary, CleanupTarget, PlannedRemoval, RemovalEngine,
    RemovalMode, SEQUENTIAL_LIMIT,
};
