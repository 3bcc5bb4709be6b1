mod json;
mod terminal;
pub mod text;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;
pub use text::{
    parse_report, read_report, render_clean_report, render_cleanup_report, render_detailed_report,
    write_report, AnalysisTotals, CLEANUP_REPORT_FILE, FULL_REPORT_FILE, REPORT_FILE,
};

use crate::model::Module;
use crate::refactor::{CleanupSummary, PlannedRemoval};
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for analysis and cleanup results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    detailed: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            detailed: false,
        }
    }

    /// Use the detailed per-module layout for terminal output
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn report_analysis(&self, modules: &[Module], target: Option<&str>) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                TerminalReporter::new()
                    .detailed(self.detailed)
                    .report_analysis(modules, target);
                Ok(())
            }
            ReportFormat::Json => {
                JsonReporter::new(self.output_path.clone()).report_analysis(modules, target)
            }
        }
    }

    pub fn report_cleanup(&self, summary: &CleanupSummary, target: Option<&str>) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                TerminalReporter::new().report_cleanup(summary, target);
                Ok(())
            }
            ReportFormat::Json => {
                JsonReporter::new(self.output_path.clone()).report_cleanup(summary, target)
            }
        }
    }

    pub fn report_plan(&self, plan: &[PlannedRemoval]) {
        TerminalReporter::new().report_plan(plan);
    }
}
