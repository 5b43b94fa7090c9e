// ABOUTME: Error taxonomy for the bootstrap sequence.
// ABOUTME: Separates directory, preflight, log-file, and launch failures by kind.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while bootstrapping the demo.
#[derive(Debug, Error)]
pub enum BootError {
    /// A required directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A service's executable is not on PATH.
    #[error("executable '{program}' for service '{service}' not found in PATH")]
    ExecutableNotFound { service: String, program: String },

    /// A service's script file does not exist.
    #[error("script {} for service '{service}' not found", .path.display())]
    MissingScript { service: String, path: PathBuf },

    /// The log file for a service could not be opened for redirection.
    #[error("failed to open log file {} for service '{service}': {source}", .path.display())]
    OpenLog {
        service: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to start a service.
    #[error("failed to launch service '{service}' ({program}): {source}")]
    LaunchFailed {
        service: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The launch plan file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The launch plan is not valid TOML for this schema.
    #[error("failed to parse config {}: {}", .path.display(), .source.message())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The launch plan parsed but describes an impossible run.
    #[error("invalid config {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },
}

impl BootError {
    /// Name of the service this error belongs to, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::ExecutableNotFound { service, .. }
            | Self::MissingScript { service, .. }
            | Self::OpenLog { service, .. }
            | Self::LaunchFailed { service, .. } => Some(service),
            Self::CreateDir { .. }
            | Self::ReadConfig { .. }
            | Self::ParseConfig { .. }
            | Self::InvalidConfig { .. } => None,
        }
    }
}
