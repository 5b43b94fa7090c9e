// ABOUTME: Launch plan configuration for demoboot.
// ABOUTME: Reads demoboot.toml (base dir, then user config dir), falling back to built-in defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BootError;
use crate::manifest::MANIFEST_FILE;

/// File name looked up in the base directory when no --config is given.
pub const LOCAL_CONFIG_FILE: &str = "demoboot.toml";

/// Top-level configuration: where things live and what to launch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving one log file per service, relative to the base dir.
    pub log_dir: PathBuf,
    /// Directory where the server keeps session keys, relative to the base dir.
    pub key_dir: PathBuf,
    /// Check executables and scripts before spawning anything.
    pub preflight: bool,
    /// Services in launch order.
    pub services: Vec<ServiceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            key_dir: PathBuf::from("../_session_keys"),
            preflight: true,
            services: default_services(),
        }
    }
}

/// One external program to start in the background.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Script the program runs; must exist when preflight is on.
    #[serde(default)]
    pub script: Option<PathBuf>,
    /// Log file name inside the log directory.
    pub log_file: PathBuf,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Pause before spawning this service.
    #[serde(default)]
    pub delay_ms: u64,
}

fn default_enabled() -> bool {
    true
}

impl ServiceSpec {
    /// Program and args joined for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The broker (off by default), the backend server, and the dashboard.
fn default_services() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec {
            name: "broker".to_string(),
            program: "mosquitto".to_string(),
            args: vec!["-c".to_string(), "/etc/mosquitto/mosquitto.conf".to_string()],
            script: None,
            log_file: PathBuf::from("mosquitto.log"),
            enabled: false,
            delay_ms: 0,
        },
        ServiceSpec {
            name: "server".to_string(),
            program: "python3".to_string(),
            args: vec!["server_dash_log.py".to_string()],
            script: Some(PathBuf::from("server_dash_log.py")),
            log_file: PathBuf::from("server.log"),
            enabled: true,
            delay_ms: 0,
        },
        ServiceSpec {
            name: "dashboard".to_string(),
            program: "streamlit".to_string(),
            args: vec!["run".to_string(), "client_dash_all_data_log.py".to_string()],
            script: Some(PathBuf::from("client_dash_all_data_log.py")),
            log_file: PathBuf::from("client_dashboard.log"),
            enabled: true,
            delay_ms: 0,
        },
    ]
}

impl Config {
    /// Load the launch plan.
    ///
    /// An explicit path must exist. Otherwise `<base_dir>/demoboot.toml` is tried,
    /// then the user config file, then the built-in defaults.
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> Result<Self, BootError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(base_dir),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_file(&path)
    }

    /// Parse and validate a config file at an exact path.
    pub fn from_file(path: &Path) -> Result<Self, BootError> {
        let content = std::fs::read_to_string(path).map_err(|source| BootError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| BootError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|message| BootError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    /// Every service needs a unique name and its own log file; the manifest
    /// file name is reserved.
    pub fn validate(&self) -> Result<(), String> {
        let mut names = HashSet::new();
        let mut logs = HashSet::new();
        for service in &self.services {
            if !names.insert(service.name.as_str()) {
                return Err(format!("duplicate service name '{}'", service.name));
            }
            if service.log_file == Path::new(MANIFEST_FILE) {
                return Err(format!(
                    "service '{}' cannot log to {MANIFEST_FILE}, it holds the launch manifest",
                    service.name
                ));
            }
            if !logs.insert(service.log_file.as_path()) {
                return Err(format!(
                    "service '{}' reuses log file {}",
                    service.name,
                    service.log_file.display()
                ));
            }
        }
        Ok(())
    }

    /// Path to the user-level config file.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("demoboot").join("config.toml"))
    }

    fn discover(base_dir: &Path) -> Option<PathBuf> {
        let local = base_dir.join(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        Self::user_config_path().filter(|p| p.exists())
    }

    /// Services that will actually be launched.
    pub fn enabled_services(&self) -> impl Iterator<Item = &ServiceSpec> {
        self.services.iter().filter(|s| s.enabled)
    }
}
