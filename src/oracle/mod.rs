//! Build oracle: decides whether the project still builds after an edit.

mod gradle;

pub use gradle::{is_failure_line, GradleOracle, LAUNCH_FAILURE_EXIT_CODE};

use serde::Serialize;

/// Result of one build invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl BuildOutcome {
    pub fn from_exit(exit_code: i32, stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            succeeded: exit_code == 0,
            stdout,
            stderr,
            exit_code,
            duration_ms,
        }
    }

    /// The build could not be run at all
    pub fn launch_failure(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::from_exit(LAUNCH_FAILURE_EXIT_CODE, String::new(), message.into(), duration_ms)
    }
}

/// Something that can confirm a project still builds.
///
/// Implementations never fail: problems running the build are a failed
/// outcome.
pub trait BuildOracle {
    /// Fast per-module check after an edit to that module's build file
    fn quick_compile_check(&self, module: &str) -> BuildOutcome;

    /// Whole-project validation, run once after all removals
    fn validate_full_build(&self) -> BuildOutcome;
}

impl<T: BuildOracle + ?Sized> BuildOracle for &T {
    fn quick_compile_check(&self, module: &str) -> BuildOutcome {
        (**self).quick_compile_check(module)
    }

    fn validate_full_build(&self) -> BuildOutcome {
        (**self).validate_full_build()
    }
}
