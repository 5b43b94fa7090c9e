// ABOUTME: Launch manifest — records which services a run started, with pids and log paths.
// ABOUTME: Written as JSON next to the service logs via atomic tmp + rename.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::launch::ServiceHandle;

/// File name of the manifest inside the log directory.
pub const MANIFEST_FILE: &str = "boot.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub started_at: DateTime<Utc>,
    pub base_dir: PathBuf,
    pub services: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub pid: u32,
    pub command: String,
    pub log_path: PathBuf,
}

impl Manifest {
    pub fn new(base_dir: &Path, handles: &[ServiceHandle]) -> Self {
        Self {
            started_at: Utc::now(),
            base_dir: base_dir.to_path_buf(),
            services: handles
                .iter()
                .map(|h| ManifestEntry {
                    name: h.name.clone(),
                    pid: h.pid,
                    command: h.command_line.clone(),
                    log_path: h.log_path.clone(),
                })
                .collect(),
        }
    }

    /// Save to an explicit path (atomic write via tmp + rename).
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp_path, &content)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_saves_and_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(MANIFEST_FILE);
        let manifest = Manifest {
            started_at: Utc::now(),
            base_dir: PathBuf::from("/srv/demo/app"),
            services: vec![ManifestEntry {
                name: "server".to_string(),
                pid: 4242,
                command: "python3 server_dash_log.py".to_string(),
                log_path: PathBuf::from("/srv/demo/app/logs/server.log"),
            }],
        };

        manifest.save_to(&path).unwrap();
        let loaded = Manifest::load_from(&path).unwrap();

        assert_eq!(loaded.services, manifest.services);
        assert_eq!(loaded.started_at, manifest.started_at);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(MANIFEST_FILE);
        std::fs::write(&path, "{ not json from an older version").unwrap();

        let manifest = Manifest {
            started_at: Utc::now(),
            base_dir: tmp.path().to_path_buf(),
            services: vec![],
        };
        manifest.save_to(&path).unwrap();

        assert!(Manifest::load_from(&path).unwrap().services.is_empty());
    }
}
