use super::text::AnalysisTotals;
use crate::model::{Dependency, Module};
use crate::oracle::BuildOutcome;
use crate::refactor::{CleanupRecord, CleanupSummary};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report_analysis(&self, modules: &[Module], target: Option<&str>) -> Result<()> {
        self.emit(&JsonAnalysisReport::from_modules(modules, target))
    }

    pub fn report_cleanup(&self, summary: &CleanupSummary, target: Option<&str>) -> Result<()> {
        self.emit(&JsonCleanupReport::from_summary(summary, target))
    }

    fn emit<T: Serialize>(&self, report: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub(crate) struct JsonDependency {
    kind: &'static str,
    name: String,
}

impl From<&Dependency> for JsonDependency {
    fn from(dependency: &Dependency) -> Self {
        Self {
            kind: dependency.kind.keyword(),
            name: dependency.name.clone(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct JsonModule {
    name: String,
    dependencies: Vec<JsonDependency>,
    unused_dependencies: Vec<JsonDependency>,
    referenced_classes: usize,
    exposed_classes: usize,
}

#[derive(Serialize)]
pub(crate) struct JsonAnalysisSummary {
    modules: usize,
    dependencies: usize,
    unused: usize,
    cleanup_potential: f64,
}

#[derive(Serialize)]
pub(crate) struct JsonAnalysisReport {
    version: &'static str,
    target: Option<String>,
    modules: Vec<JsonModule>,
    summary: JsonAnalysisSummary,
}

impl JsonAnalysisReport {
    pub(crate) fn from_modules(modules: &[Module], target: Option<&str>) -> Self {
        let totals = AnalysisTotals::of(modules);
        Self {
            version: env!("CARGO_PKG_VERSION"),
            target: target.map(str::to_string),
            modules: modules
                .iter()
                .map(|m| JsonModule {
                    name: m.name.clone(),
                    dependencies: m.dependencies.iter().map(JsonDependency::from).collect(),
                    unused_dependencies: m
                        .unused_dependencies()
                        .iter()
                        .map(JsonDependency::from)
                        .collect(),
                    referenced_classes: m.referenced_classes.len(),
                    exposed_classes: m.exposed_classes.len(),
                })
                .collect(),
            summary: JsonAnalysisSummary {
                modules: totals.modules,
                dependencies: totals.dependencies,
                unused: totals.unused,
                cleanup_potential: totals.cleanup_potential(),
            },
        }
    }
}

#[derive(Serialize)]
pub(crate) struct JsonRecord {
    module: String,
    dependency: JsonDependency,
    removed: bool,
    build_confirmed: bool,
    reason: String,
    state: &'static str,
}

impl From<&CleanupRecord> for JsonRecord {
    fn from(record: &CleanupRecord) -> Self {
        Self {
            module: record.module.clone(),
            dependency: JsonDependency::from(&record.dependency),
            removed: record.removed,
            build_confirmed: record.build_confirmed,
            reason: record.reason.clone(),
            state: record.state.as_str(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct JsonFinalValidation {
    succeeded: bool,
    exit_code: i32,
    duration_ms: u64,
}

impl From<&BuildOutcome> for JsonFinalValidation {
    fn from(outcome: &BuildOutcome) -> Self {
        Self {
            succeeded: outcome.succeeded,
            exit_code: outcome.exit_code,
            duration_ms: outcome.duration_ms,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct JsonCleanupReport {
    version: &'static str,
    target: Option<String>,
    removed: usize,
    failed: usize,
    quick_checks: usize,
    final_validation: Option<JsonFinalValidation>,
    records: Vec<JsonRecord>,
}

impl JsonCleanupReport {
    pub(crate) fn from_summary(summary: &CleanupSummary, target: Option<&str>) -> Self {
        let records: Vec<JsonRecord> = summary
            .latest_records()
            .into_iter()
            .map(JsonRecord::from)
            .collect();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            target: target.map(str::to_string),
            removed: records.iter().filter(|r| r.removed).count(),
            failed: records.iter().filter(|r| !r.removed).count(),
            quick_checks: summary.quick_checks,
            final_validation: summary.final_validation.as_ref().map(JsonFinalValidation::from),
            records,
        }
    }
}
