// ABOUTME: Bootstrap orchestrator — the one-shot sequence behind `demoboot`.
// ABOUTME: Ensures directories, runs preflight, launches services detached, and reports.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::BootError;
use crate::launch::{self, ServiceHandle};
use crate::layout::Layout;
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::preflight;

/// Outcome of a launch pass that got past directory creation and preflight.
#[derive(Debug, Default)]
pub struct LaunchReport {
    /// Services that were spawned, in launch order. Never awaited.
    pub launched: Vec<ServiceHandle>,
    /// Services whose spawn failed.
    pub failures: Vec<BootError>,
}

impl LaunchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.launched.iter().map(|h| h.pid).collect()
    }
}

/// Prepares the filesystem and starts every enabled service.
pub struct Orchestrator {
    config: Config,
    layout: Layout,
    preflight: bool,
}

impl Orchestrator {
    /// Create an orchestrator rooted at `base_dir`.
    pub fn new(base_dir: &Path, config: Config) -> Self {
        let layout = Layout::new(base_dir, &config);
        let preflight = config.preflight;
        Self {
            config,
            layout,
            preflight,
        }
    }

    /// Override the config's preflight setting.
    pub fn with_preflight(mut self, enabled: bool) -> Self {
        self.preflight = enabled;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Run the sequence, printing status lines to stdout.
    pub fn run(&self) -> Result<LaunchReport, BootError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Run the sequence, printing status lines to `out`.
    ///
    /// Directory and preflight errors abort before anything is spawned. Spawn errors
    /// are collected in the report and the remaining services are still launched.
    pub fn run_with_output<W: Write>(&self, out: &mut W) -> Result<LaunchReport, BootError> {
        say(out, format_args!("[BOOT] Starting demo in {}", self.layout.base_dir.display()));

        self.layout.ensure_dirs()?;

        if self.preflight {
            for found in preflight::check(&self.layout, self.config.enabled_services())? {
                say(
                    out,
                    format_args!("[✓] {} found at {}", found.program, found.executable.display()),
                );
            }
        } else {
            tracing::debug!("preflight skipped");
        }

        let mut report = LaunchReport::default();
        for service in self.config.enabled_services() {
            if service.delay_ms > 0 {
                tracing::debug!(service = %service.name, delay_ms = service.delay_ms, "delaying launch");
                std::thread::sleep(Duration::from_millis(service.delay_ms));
            }

            say(
                out,
                format_args!(
                    "Launching {} -> {}",
                    service.name,
                    self.layout.log_path(service).display()
                ),
            );
            match launch::spawn_detached(&self.layout, service) {
                Ok(handle) => {
                    say(
                        out,
                        format_args!("[✓] Launched: {} (pid {})", handle.command_line, handle.pid),
                    );
                    report.launched.push(handle);
                }
                Err(e) => {
                    tracing::warn!(service = %service.name, error = %e, "launch failed");
                    say(out, format_args!("[✗] Launch failed: {e}"));
                    report.failures.push(e);
                }
            }
        }

        let manifest_path = self.manifest_path();
        if let Err(e) = Manifest::new(&self.layout.base_dir, &report.launched).save_to(&manifest_path) {
            tracing::warn!(path = %manifest_path.display(), "failed to write launch manifest: {e:#}");
        }

        if report.is_success() {
            say(
                out,
                format_args!(
                    "All services launched. Check '{}' for outputs.",
                    self.layout.log_dir.display()
                ),
            );
        } else {
            say(
                out,
                format_args!(
                    "{} of {} services failed to launch. Check '{}' for outputs.",
                    report.failures.len(),
                    report.failures.len() + report.launched.len(),
                    self.layout.log_dir.display()
                ),
            );
        }
        Ok(report)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.layout.log_dir.join(MANIFEST_FILE)
    }
}

/// Status lines are best-effort; a closed stdout must not abort the launch.
fn say<W: Write>(out: &mut W, line: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{line}") {
        tracing::debug!("status line dropped: {e}");
    }
}
