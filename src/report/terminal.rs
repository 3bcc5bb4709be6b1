use super::text::{render_cleanup_report, render_clean_report, render_detailed_report, AnalysisTotals};
use crate::model::Module;
use crate::refactor::{CleanupSummary, PlannedRemoval};
use colored::Colorize;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    detailed: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { detailed: false }
    }

    /// Show every module with its classes instead of only the findings
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn report_analysis(&self, modules: &[Module], target: Option<&str>) {
        let text = if self.detailed {
            render_detailed_report(modules)
        } else {
            render_clean_report(modules, target)
        };
        println!();
        print_styled(&text);

        let totals = AnalysisTotals::of(modules);
        println!();
        if totals.unused == 0 {
            println!("{}", "No unused dependencies found!".green().bold());
        } else {
            println!(
                "{}",
                format!(
                    "Found {} unused dependencies in {} modules",
                    totals.unused,
                    modules
                        .iter()
                        .filter(|m| !m.unused_dependencies().is_empty())
                        .count()
                )
                .yellow()
                .bold()
            );
        }
    }

    pub fn report_plan(&self, plan: &[PlannedRemoval]) {
        println!();
        println!("{}", "Dry run - would try to remove:".yellow().bold());
        if plan.is_empty() {
            println!("  {}", "(nothing)".dimmed());
            return;
        }

        for planned in plan {
            let mode = format!("[{} mode]", planned.mode).dimmed();
            if planned.has_build_file {
                println!("{} {}", planned.module.cyan().bold(), mode);
            } else {
                println!(
                    "{} {} {}",
                    planned.module.cyan().bold(),
                    mode,
                    "no build file".red()
                );
            }
            for dependency in &planned.dependencies {
                println!("  - {}", dependency);
            }
        }

        let total: usize = plan.iter().map(|p| p.dependencies.len()).sum();
        println!();
        println!(
            "{}",
            format!("Total: {} dependencies in {} modules", total, plan.len()).dimmed()
        );
    }

    pub fn report_cleanup(&self, summary: &CleanupSummary, target: Option<&str>) {
        println!();
        print_styled(&render_cleanup_report(summary, target));

        let removed = summary.removed().len();
        let failed = summary.failed().len();
        println!();
        println!(
            "{} {} {}",
            format!("{} removed", removed).green().bold(),
            format!("{} kept", failed).yellow(),
            format!("({} quick checks)", summary.quick_checks).dimmed()
        );
        if summary.final_build_failed() {
            println!(
                "{}",
                "Full build validation failed after cleanup; review the removed dependencies."
                    .red()
                    .bold()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Print report text, coloring headings, module lines and entries
fn print_styled(text: &str) {
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("Module: ") || trimmed.starts_with("MODULE: ") {
            println!("{}", line.cyan().bold());
        } else if trimmed.starts_with("- ") {
            println!("{}", line.yellow());
        } else if trimmed.starts_with('├') || trimmed.starts_with('└') {
            println!("{}", line.dimmed());
        } else if trimmed.starts_with('=') || trimmed.starts_with('═') || trimmed.starts_with('─') {
            println!("{}", line.dimmed());
        } else if line.ends_with(':') || line.chars().all(|c| !c.is_lowercase()) {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}
