// ABOUTME: Filesystem layout — resolves configured paths against the base directory.
// ABOUTME: Creates the log and session-key directories before anything is launched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, ServiceSpec};
use crate::error::BootError;

/// Absolute locations derived from the base directory and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub log_dir: PathBuf,
    pub key_dir: PathBuf,
}

impl Layout {
    pub fn new(base_dir: &Path, config: &Config) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            log_dir: base_dir.join(&config.log_dir),
            key_dir: base_dir.join(&config.key_dir),
        }
    }

    /// Where a service's output is captured.
    pub fn log_path(&self, service: &ServiceSpec) -> PathBuf {
        self.log_dir.join(&service.log_file)
    }

    /// A service's script, resolved against the base directory.
    pub fn script_path(&self, service: &ServiceSpec) -> Option<PathBuf> {
        service.script.as_ref().map(|s| self.base_dir.join(s))
    }

    /// Create the log and key directories (and any missing parents).
    ///
    /// Safe to call repeatedly; stops at the first directory that cannot be created.
    pub fn ensure_dirs(&self) -> Result<(), BootError> {
        for dir in [&self.log_dir, &self.key_dir] {
            fs::create_dir_all(dir).map_err(|source| BootError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            tracing::debug!(path = %dir.display(), "directory ready");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_against_base() {
        let layout = Layout::new(Path::new("/srv/demo/app"), &Config::default());
        assert_eq!(layout.log_dir, PathBuf::from("/srv/demo/app/logs"));
        assert_eq!(layout.key_dir, PathBuf::from("/srv/demo/app/../_session_keys"));

        let config = Config::default();
        let server = &config.services[1];
        assert_eq!(
            layout.log_path(server),
            PathBuf::from("/srv/demo/app/logs/server.log")
        );
        assert_eq!(
            layout.script_path(server),
            Some(PathBuf::from("/srv/demo/app/server_dash_log.py"))
        );
        assert_eq!(layout.script_path(&config.services[0]), None);
    }

    #[test]
    fn ensure_dirs_creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("checkout").join("app");
        let layout = Layout::new(&base, &Config::default());

        layout.ensure_dirs().unwrap();

        assert!(base.join("logs").is_dir());
        assert!(tmp.path().join("checkout").join("_session_keys").is_dir());
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("app");
        let layout = Layout::new(&base, &Config::default());

        layout.ensure_dirs().unwrap();
        fs::write(base.join("logs").join("server.log"), "old run\n").unwrap();
        layout.ensure_dirs().unwrap();

        assert_eq!(
            fs::read_to_string(base.join("logs").join("server.log")).unwrap(),
            "old run\n"
        );
    }

    #[test]
    fn ensure_dirs_reports_failing_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("app");
        fs::write(&blocker, "not a directory").unwrap();
        let layout = Layout::new(&blocker, &Config::default());

        match layout.ensure_dirs() {
            Err(BootError::CreateDir { path, .. }) => assert_eq!(path, blocker.join("logs")),
            other => panic!("expected CreateDir, got {:?}", other),
        }
    }
}
