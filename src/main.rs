use clap::Parser;
use colored::Colorize;
use depprune::analysis::{analyze_project, AnalysisOptions};
use depprune::config::Config;
use depprune::model::Module;
use depprune::oracle::GradleOracle;
use depprune::refactor::{CleanupTarget, RemovalEngine};
use depprune::report::{
    self, read_report, render_clean_report, render_cleanup_report, render_detailed_report,
    write_report, Reporter, CLEANUP_REPORT_FILE, FULL_REPORT_FILE, REPORT_FILE,
};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// depprune - Find and safely remove unused module dependencies in Gradle projects
#[derive(Parser, Debug)]
#[command(name = "depprune")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Gradle project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only report (or clean) this module, e.g. `feature:home`
    #[arg(short, long)]
    module: Option<String>,

    /// Show every module with its dependencies and classes
    #[arg(long)]
    full_report: bool,

    /// Exit with an error when unused dependencies are found
    #[arg(long)]
    fail_on_unused: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Remove unused dependencies, validating each removal with a build
    #[arg(long)]
    cleanup: bool,

    /// Clean up the dependencies listed in a previously written report
    /// instead of analyzing again
    #[arg(long, value_name = "FILE", requires = "cleanup")]
    from_report: Option<PathBuf>,

    /// Dry run - show what would be removed without changing or building anything
    #[arg(long)]
    dry_run: bool,

    /// Confirm each module before cleaning it
    #[arg(long)]
    interactive: bool,

    /// Modules to leave out of analysis (can be specified multiple times)
    #[arg(long, value_name = "MODULE")]
    exclude_module: Vec<String>,

    /// Build tool command used to validate removals
    #[arg(long, value_name = "CMD")]
    gradle: Option<String>,

    /// How long to wait for build output after the build exits
    #[arg(long, value_name = "MS")]
    join_timeout_ms: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("depprune v{}", env!("CARGO_PKG_VERSION"));

    if !cli.path.is_dir() {
        return Err(miette::miette!(
            "Project directory does not exist: {}",
            cli.path.display()
        ));
    }

    let config = load_config(&cli)?;

    if cli.cleanup {
        run_cleanup(&config, &cli)
    } else {
        run_analysis(&config, &cli)
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .into_diagnostic()
            .wrap_err("Failed to load configuration")?
    } else {
        Config::from_default_locations(&cli.path)
    };

    // Override with CLI arguments
    config
        .excluded_modules
        .extend(cli.exclude_module.iter().map(|m| m.trim_start_matches(':').to_string()));
    if let Some(gradle) = &cli.gradle {
        config.oracle.command = gradle.clone();
    }
    if let Some(timeout) = cli.join_timeout_ms {
        config.oracle.join_timeout_ms = timeout;
    }

    Ok(config)
}

fn is_terminal_output(cli: &Cli) -> bool {
    matches!(cli.format, OutputFormat::Terminal)
}

fn analyze(config: &Config, cli: &Cli) -> Vec<Module> {
    let options = AnalysisOptions {
        target_module: cli.module.clone(),
        progress: !cli.quiet && is_terminal_output(cli),
    };
    analyze_project(&cli.path, config, &options)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    let modules = analyze(config, cli);
    let target = cli.module.as_deref();

    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone())
        .detailed(cli.full_report);
    reporter.report_analysis(&modules, target)?;

    let clean = write_report(&cli.path, REPORT_FILE, &render_clean_report(&modules, target))?;
    announce_report(cli, "Report saved to", &clean);
    if cli.full_report {
        let full = write_report(&cli.path, FULL_REPORT_FILE, &render_detailed_report(&modules))?;
        announce_report(cli, "Full report saved to", &full);
    }

    let total_unused: usize = modules.iter().map(|m| m.unused_dependencies().len()).sum();
    if cli.fail_on_unused && total_unused > 0 {
        return Err(miette::miette!(
            "Found {} unused dependencies. Remove them or run without --fail-on-unused",
            total_unused
        ));
    }

    Ok(())
}

fn run_cleanup(config: &Config, cli: &Cli) -> Result<()> {
    let target = cli.module.as_deref();

    let mut targets: Vec<CleanupTarget> = if let Some(report_path) = &cli.from_report {
        info!("Reading unused dependencies from {}", report_path.display());
        read_report(report_path)?
    } else {
        analyze(config, cli).iter().map(CleanupTarget::from).collect()
    };

    if let Some(module) = target {
        let module = module.trim_start_matches(':');
        targets.retain(|t| t.module == module);
    }
    targets.retain(|t| !t.dependencies.is_empty() && !config.is_module_excluded(&t.module));

    if targets.is_empty() {
        println!("{}", "No unused dependencies to remove.".green());
        return Ok(());
    }

    if cli.interactive {
        targets = confirm_targets(targets)?;
        if targets.is_empty() {
            println!("{}", "No modules selected for cleanup.".yellow());
            return Ok(());
        }
    }

    let oracle = GradleOracle::new(cli.path.clone(), config.oracle.clone());
    let engine = RemovalEngine::new(&cli.path, &oracle);
    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone());

    if cli.dry_run {
        reporter.report_plan(&engine.plan(&targets));
        return Ok(());
    }

    let summary = engine.apply_removal(&targets);
    reporter.report_cleanup(&summary, target)?;

    let path = write_report(
        &cli.path,
        CLEANUP_REPORT_FILE,
        &render_cleanup_report(&summary, target),
    )?;
    announce_report(cli, "Cleanup report saved to", &path);

    if summary.final_build_failed() {
        warn!("Full build validation failed; removals were kept");
    }

    Ok(())
}

fn confirm_targets(targets: Vec<CleanupTarget>) -> Result<Vec<CleanupTarget>> {
    let theme = ColorfulTheme::default();
    let mut selected = Vec::new();

    for target in targets {
        println!();
        println!("{}", format!("Module: {}", target.module).cyan().bold());
        for dependency in &target.dependencies {
            println!("  - {}", dependency);
        }

        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(format!(
                "Try removing {} dependencies from {}?",
                target.dependencies.len(),
                target.module
            ))
            .default(true)
            .interact()
            .into_diagnostic()?;

        if confirmed {
            selected.push(target);
        }
    }

    Ok(selected)
}

fn announce_report(cli: &Cli, label: &str, path: &Path) {
    if is_terminal_output(cli) && !cli.quiet {
        println!("{} {}", label.dimmed(), path.display());
    }
}
