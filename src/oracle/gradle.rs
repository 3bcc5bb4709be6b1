use super::{BuildOracle, BuildOutcome};
use crate::config::OracleConfig;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Exit code reported when the build could not be launched or was killed
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const FAILURE_MARKERS: [&str; 7] = [
    "BUILD FAILED",
    "FAILURE:",
    "ERROR:",
    "error:",
    "Error:",
    "Exception:",
    "Compilation error",
];

/// Lines worth surfacing while a build streams
pub fn is_failure_line(line: &str) -> bool {
    FAILURE_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Runs the project's Gradle wrapper.
///
/// Builds through one oracle never overlap. Separate oracles on the same
/// root do not coordinate, so share a single instance per project.
pub struct GradleOracle {
    project_root: PathBuf,
    config: OracleConfig,
    // Held for the whole run, per instance
    lock: Mutex<()>,
}

impl GradleOracle {
    pub fn new(project_root: impl Into<PathBuf>, config: OracleConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Full argument list for a task set: tasks, then flags
    pub fn arguments(&self, tasks: &[String]) -> Vec<String> {
        tasks
            .iter()
            .chain(self.config.flags.iter())
            .cloned()
            .collect()
    }

    /// Run the build tool with `tasks` and capture its result.
    ///
    /// Never fails: a build that cannot be started is reported with
    /// exit code -1.
    pub fn run_oracle(&self, tasks: &[String]) -> BuildOutcome {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let start = Instant::now();
        let args = self.arguments(tasks);
        info!("Executing: {} {}", self.config.command, args.join(" "));

        match self.execute(&args, start) {
            Ok(outcome) => {
                if outcome.succeeded {
                    info!("Build succeeded in {}ms", outcome.duration_ms);
                } else {
                    info!(
                        "Build failed with exit code {} in {}ms",
                        outcome.exit_code, outcome.duration_ms
                    );
                }
                outcome
            }
            Err(e) => {
                error!("Build execution failed: {:#}", e);
                BuildOutcome::launch_failure(
                    format!("Build execution failed: {:#}", e),
                    elapsed_ms(start),
                )
            }
        }
    }

    fn program(&self) -> PathBuf {
        let command = Path::new(&self.config.command);
        // ./gradlew is relative to the project, not to our working directory
        if command.is_relative() && command.components().count() > 1 {
            self.project_root.join(command)
        } else {
            command.to_path_buf()
        }
    }

    fn execute(&self, args: &[String], start: Instant) -> Result<BuildOutcome> {
        let program = self.program();
        let mut child = Command::new(&program)
            .args(args)
            .current_dir(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", program.display()))?;

        let outcome = self.capture(&mut child, start);
        if outcome.is_err() {
            reap(&mut child);
        }
        outcome
    }

    /// Drain output, wait for exit and assemble the outcome
    fn capture(&self, child: &mut Child, start: Instant) -> Result<BuildOutcome> {
        let (done_tx, done_rx) = mpsc::channel();
        let stdout = spawn_drain(child.stdout.take(), StreamKind::Stdout, done_tx.clone())?;
        let stderr = spawn_drain(child.stderr.take(), StreamKind::Stderr, done_tx)?;

        let status = self.wait(child)?;

        let join_timeout = Duration::from_millis(self.config.join_timeout_ms);
        await_drains(&done_rx, 2, join_timeout);

        let duration_ms = elapsed_ms(start);
        let stdout = take_buffer(&stdout);
        let stderr = take_buffer(&stderr);

        let exit_code = match status {
            Some(status) => exit_code_of(status),
            None => {
                warn!(
                    "Build exceeded {}s and was killed",
                    self.config.build_timeout_secs.unwrap_or_default()
                );
                LAUNCH_FAILURE_EXIT_CODE
            }
        };

        Ok(BuildOutcome::from_exit(exit_code, stdout, stderr, duration_ms))
    }

    /// Wait for exit; `None` when the build timeout killed the child
    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let Some(limit) = self.config.build_timeout_secs.map(Duration::from_secs) else {
            return child.wait().map(Some).context("failed to wait for build");
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait().context("failed to poll build")? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                child.kill().context("failed to kill timed out build")?;
                child.wait().context("failed to reap timed out build")?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl BuildOracle for GradleOracle {
    fn quick_compile_check(&self, module: &str) -> BuildOutcome {
        let tasks = self.config.quick_tasks_for(module);
        self.run_oracle(&tasks)
    }

    fn validate_full_build(&self) -> BuildOutcome {
        self.run_oracle(&self.config.full_tasks)
    }
}

/// Kill and reap a child abandoned on an error path
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Could not kill build process: {}", e);
    }
    let _ = child.wait();
}

#[derive(Debug, Clone, Copy)]
enum StreamKind {
    Stdout,
    Stderr,
}

type SharedBuffer = Arc<Mutex<String>>;

/// Copy a child stream into a shared buffer on its own thread, signalling
/// `done` at end of stream
fn spawn_drain<R>(stream: Option<R>, kind: StreamKind, done: Sender<()>) -> Result<SharedBuffer>
where
    R: Read + Send + 'static,
{
    let buffer: SharedBuffer = Arc::new(Mutex::new(String::new()));
    let Some(stream) = stream else {
        let _ = done.send(());
        return Ok(buffer);
    };

    let sink = Arc::clone(&buffer);
    thread::Builder::new()
        .name(format!("build-{:?}", kind).to_lowercase())
        .spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&raw);
                        echo_line(kind, line.trim_end());
                        sink.lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner())
                            .push_str(&line);
                    }
                    Err(e) => {
                        debug!("Stopped reading build {:?}: {}", kind, e);
                        break;
                    }
                }
            }
            let _ = done.send(());
        })
        .context("failed to start output reader")?;

    Ok(buffer)
}

fn echo_line(kind: StreamKind, line: &str) {
    if is_failure_line(line) {
        match kind {
            StreamKind::Stdout => warn!("    {}", line),
            StreamKind::Stderr => warn!("    ERROR: {}", line),
        }
    } else {
        debug!("    {}", line);
    }
}

/// Wait for `expected` drain signals, bounded by `timeout` overall
fn await_drains(done: &Receiver<()>, expected: usize, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    for _ in 0..expected {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if done.recv_timeout(remaining).is_err() {
            debug!("Build output still open after {}ms; using what was captured", timeout.as_millis());
            return;
        }
    }
}

fn take_buffer(buffer: &SharedBuffer) -> String {
    buffer
        .lock()
        .map(|captured| captured.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(LAUNCH_FAILURE_EXIT_CODE)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
