// Plain-text report files written to the project root

use crate::model::{Dependency, Module};
use crate::refactor::{CleanupSummary, CleanupTarget};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const REPORT_FILE: &str = "dependency-report.txt";
pub const FULL_REPORT_FILE: &str = "full-dependency-report.txt";
pub const CLEANUP_REPORT_FILE: &str = "dependency-cleanup-report.txt";

/// Classes listed per section of the detailed report
pub const MAX_DISPLAYED_CLASSES: usize = 10;

const MODULE_PREFIX: &str = "Module: ";
const ITEM_PREFIX: &str = "- ";
const SUMMARY_SEPARATOR_LENGTH: usize = 80;

pub fn clean_report_header(target: Option<&str>) -> String {
    match target {
        Some(module) => format!("Unused Dependencies Analysis for module: {}", module),
        None => "Unused Dependencies Analysis:".to_string(),
    }
}

/// Modules with unused dependencies, in the format `parse_report` reads back
pub fn render_clean_report(modules: &[Module], target: Option<&str>) -> String {
    let header = clean_report_header(target);
    let mut out = String::new();
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "=".repeat(header.chars().count()));

    let with_unused: Vec<&Module> = modules
        .iter()
        .filter(|m| !m.unused_dependencies().is_empty())
        .collect();

    if with_unused.is_empty() {
        let _ = writeln!(out, "No unused dependencies found!");
        return out;
    }

    for module in with_unused {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}{}", MODULE_PREFIX, module.name);
        for dependency in module.unused_dependencies() {
            let _ = writeln!(out, "    {}{}", ITEM_PREFIX, dependency);
        }
    }
    out
}

/// Classes sorted for stable output, capped at `MAX_DISPLAYED_CLASSES`
pub fn displayed_classes<'a>(classes: impl IntoIterator<Item = &'a String>) -> (Vec<&'a str>, usize) {
    let mut all: Vec<&str> = classes.into_iter().map(String::as_str).collect();
    all.sort_unstable();
    let hidden = all.len().saturating_sub(MAX_DISPLAYED_CLASSES);
    all.truncate(MAX_DISPLAYED_CLASSES);
    (all, hidden)
}

/// Totals shown at the end of the detailed report
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisTotals {
    pub modules: usize,
    pub dependencies: usize,
    pub unused: usize,
    pub referenced_classes: usize,
    pub exposed_classes: usize,
}

impl AnalysisTotals {
    pub fn of(modules: &[Module]) -> Self {
        Self {
            modules: modules.len(),
            dependencies: modules.iter().map(|m| m.dependencies.len()).sum(),
            unused: modules.iter().map(|m| m.unused_dependencies().len()).sum(),
            referenced_classes: modules.iter().map(|m| m.referenced_classes.len()).sum(),
            exposed_classes: modules.iter().map(|m| m.exposed_classes.len()).sum(),
        }
    }

    /// Share of declared dependencies that are unused, in percent
    pub fn cleanup_potential(&self) -> f64 {
        if self.dependencies == 0 {
            0.0
        } else {
            self.unused as f64 / self.dependencies as f64 * 100.0
        }
    }
}

fn tree_prefix(is_last: bool) -> &'static str {
    if is_last {
        "   └─"
    } else {
        "   ├─"
    }
}

fn render_dependencies(out: &mut String, title: &str, dependencies: &[Dependency], empty: &str) {
    let _ = writeln!(out, "{} ({} total)", title, dependencies.len());
    if dependencies.is_empty() {
        let _ = writeln!(out, "   └─ {}", empty);
        return;
    }
    for (i, dependency) in dependencies.iter().enumerate() {
        let _ = writeln!(out, "{} {}", tree_prefix(i + 1 == dependencies.len()), dependency);
    }
}

fn render_classes<'a>(out: &mut String, title: &str, classes: impl ExactSizeIterator<Item = &'a String>) {
    let total = classes.len();
    let _ = writeln!(out, "{} ({} total)", title, total);
    if total == 0 {
        let _ = writeln!(out, "   └─ (none)");
        return;
    }
    let (shown, hidden) = displayed_classes(classes);
    for (i, class) in shown.iter().enumerate() {
        let _ = writeln!(out, "{} {}", tree_prefix(hidden == 0 && i + 1 == shown.len()), class);
    }
    if hidden > 0 {
        let _ = writeln!(out, "   └─ ... and {} more classes", hidden);
    }
}

/// Per-module dependencies, classes and unused dependencies plus totals
pub fn render_detailed_report(modules: &[Module]) -> String {
    let title = "DETAILED MODULE ANALYSIS REPORT";
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "═".repeat(title.chars().count()));
    let _ = writeln!(out, "Total modules analyzed: {}", modules.len());
    let _ = writeln!(out);

    for (index, module) in modules.iter().enumerate() {
        let header = format!("MODULE: {}", module.name);
        let _ = writeln!(out, "{}", header);
        let _ = writeln!(out, "{}", "─".repeat(header.chars().count()));

        render_dependencies(&mut out, "DEPENDENCIES", &module.dependencies, "(none)");
        let _ = writeln!(out);
        render_classes(&mut out, "REFERENCED CLASSES", module.referenced_classes.iter());
        let _ = writeln!(out);
        render_classes(&mut out, "EXPOSED CLASSES", module.exposed_classes.iter());
        let _ = writeln!(out);
        render_dependencies(
            &mut out,
            "UNUSED DEPENDENCIES",
            module.unused_dependencies(),
            "All dependencies are used!",
        );

        if index + 1 < modules.len() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "═".repeat(SUMMARY_SEPARATOR_LENGTH));
            let _ = writeln!(out);
        }
    }

    let totals = AnalysisTotals::of(modules);
    let _ = writeln!(out);
    let _ = writeln!(out, "ANALYSIS SUMMARY");
    let _ = writeln!(out, "{}", "═".repeat(20));
    let _ = writeln!(out, "Total Dependencies:       {}", totals.dependencies);
    let _ = writeln!(out, "Total Unused:             {}", totals.unused);
    let _ = writeln!(out, "Total Referenced Classes: {}", totals.referenced_classes);
    let _ = writeln!(out, "Total Exposed Classes:    {}", totals.exposed_classes);
    let _ = writeln!(out, "Cleanup Potential:        {:.1}%", totals.cleanup_potential());
    out
}

/// Read a clean report back into cleanup targets.
///
/// Modules without entries are dropped; entries that are not in
/// `"<kind> <name>"` form are skipped with a warning.
pub fn parse_report(contents: &str) -> Vec<CleanupTarget> {
    let mut targets: Vec<CleanupTarget> = Vec::new();

    for line in contents.lines() {
        let trimmed = line.trim();
        if let Some(module) = trimmed.strip_prefix(MODULE_PREFIX) {
            targets.push(CleanupTarget::new(module.trim(), Vec::new()));
        } else if let Some(entry) = trimmed.strip_prefix(ITEM_PREFIX) {
            let Some(current) = targets.last_mut() else {
                continue;
            };
            match entry.parse::<Dependency>() {
                Ok(dependency) => current.dependencies.push(dependency),
                Err(e) => warn!("Skipping report entry for {}: {}", current.module, e),
            }
        }
    }

    targets.retain(|t| !t.dependencies.is_empty());
    debug!("Parsed {} modules with unused dependencies from report", targets.len());
    targets
}

/// Read and parse a clean report file
pub fn read_report(path: &Path) -> Result<Vec<CleanupTarget>> {
    let contents = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Dependency report not found: {}", path.display()))?;
    Ok(parse_report(&contents))
}

/// Cleanup results: summary, removed and failed dependencies per module
pub fn render_cleanup_report(summary: &CleanupSummary, target: Option<&str>) -> String {
    let header = "Dependency Cleanup Report";
    let removed = summary.removed();
    let failed = summary.failed();

    let mut out = String::new();
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "=".repeat(header.len()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Target: {}", target.unwrap_or("All modules"));
    let _ = writeln!(
        out,
        "Summary: {} dependencies removed, {} failed",
        removed.len(),
        failed.len()
    );
    if let Some(outcome) = &summary.final_validation {
        let status = if outcome.succeeded { "passed" } else { "FAILED" };
        let _ = writeln!(
            out,
            "Full build validation: {} (exit code {}, {}ms)",
            status, outcome.exit_code, outcome.duration_ms
        );
    }
    let _ = writeln!(out);

    if !removed.is_empty() {
        let _ = writeln!(out, "Successfully Removed ({}):", removed.len());
        for (module, records) in CleanupSummary::by_module(&removed) {
            let _ = writeln!(out, "{}{}", MODULE_PREFIX, module);
            for record in records {
                let _ = writeln!(out, "  {}{}", ITEM_PREFIX, record.dependency);
            }
        }
        let _ = writeln!(out);
    }

    if !failed.is_empty() {
        let _ = writeln!(out, "Failed to Remove ({}):", failed.len());
        for (module, records) in CleanupSummary::by_module(&failed) {
            let _ = writeln!(out, "{}{}", MODULE_PREFIX, module);
            for record in records {
                let _ = writeln!(out, "  {}{} ({})", ITEM_PREFIX, record.dependency, record.reason);
            }
        }
    }
    out
}

/// Write `contents` to `name` under the project root
pub fn write_report(project_root: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = project_root.join(name);
    std::fs::write(&path, contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}
