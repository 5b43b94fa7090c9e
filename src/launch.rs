// ABOUTME: Detached service launcher — spawns one program with output redirected to a log file.
// ABOUTME: Returns a handle to the child without ever waiting on it.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::config::ServiceSpec;
use crate::error::BootError;
use crate::layout::Layout;

/// A running service started by this process.
///
/// Dropping the handle neither kills nor reaps the child.
#[derive(Debug)]
pub struct ServiceHandle {
    pub name: String,
    pub pid: u32,
    pub command_line: String,
    pub log_path: PathBuf,
    pub child: Child,
}

/// Start `service` in the background with stdout and stderr captured in its log file.
///
/// The log file is created or truncated. Only the immediate spawn result is checked;
/// a child that dies later shows up in its own log.
pub fn spawn_detached(layout: &Layout, service: &ServiceSpec) -> Result<ServiceHandle, BootError> {
    let log_path = layout.log_path(service);
    let stdout = open_log(&log_path, &service.name)?;
    let stderr = stdout.try_clone().map_err(|source| BootError::OpenLog {
        service: service.name.clone(),
        path: log_path.clone(),
        source,
    })?;

    let mut cmd = Command::new(program_path(&layout.base_dir, &service.program));
    cmd.args(&service.args)
        .current_dir(&layout.base_dir)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);
    detach(&mut cmd);

    let child = cmd.spawn().map_err(|source| BootError::LaunchFailed {
        service: service.name.clone(),
        program: service.program.clone(),
        source,
    })?;

    let pid = child.id();
    tracing::debug!(service = %service.name, pid, log = %log_path.display(), "service spawned");
    Ok(ServiceHandle {
        name: service.name.clone(),
        pid,
        command_line: service.command_line(),
        log_path,
        child,
    })
}

fn open_log(path: &Path, service: &str) -> Result<File, BootError> {
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| BootError::OpenLog {
            service: service.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

/// Programs written as paths are relative to the base dir; bare names go through PATH.
fn program_path(base_dir: &Path, program: &str) -> PathBuf {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 && candidate.is_relative() {
        base_dir.join(candidate)
    } else {
        candidate.to_path_buf()
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    // Own process group, so a Ctrl-C aimed at us does not reach the service.
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::Config;

    fn service(program: &str, args: &[&str]) -> ServiceSpec {
        ServiceSpec {
            name: "echo".to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            script: None,
            log_file: PathBuf::from("echo.log"),
            enabled: true,
            delay_ms: 0,
        }
    }

    fn ready_layout(base: &Path) -> Layout {
        let layout = Layout::new(base, &Config::default());
        layout.ensure_dirs().unwrap();
        layout
    }

    #[test]
    fn program_path_keeps_bare_names() {
        let base = Path::new("/srv/app");
        assert_eq!(program_path(base, "python3"), PathBuf::from("python3"));
        assert_eq!(program_path(base, "/usr/bin/env"), PathBuf::from("/usr/bin/env"));
        assert_eq!(program_path(base, "./run.sh"), PathBuf::from("/srv/app/./run.sh"));
        assert_eq!(program_path(base, "bin/api"), PathBuf::from("/srv/app/bin/api"));
    }

    #[test]
    fn stdout_and_stderr_land_in_log() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ready_layout(&tmp.path().join("app"));

        let mut handle =
            spawn_detached(&layout, &service("sh", &["-c", "echo out; echo err >&2"])).unwrap();
        handle.child.wait().unwrap();

        let log = fs::read_to_string(&handle.log_path).unwrap();
        assert!(log.contains("out"));
        assert!(log.contains("err"));
        assert_eq!(handle.command_line, "sh -c echo out; echo err >&2");
    }

    #[test]
    fn child_runs_in_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("app");
        let layout = ready_layout(&base);

        let mut handle = spawn_detached(&layout, &service("pwd", &[])).unwrap();
        handle.child.wait().unwrap();

        let log = fs::read_to_string(&handle.log_path).unwrap();
        let reported = PathBuf::from(log.trim()).canonicalize().unwrap();
        assert_eq!(reported, base.canonicalize().unwrap());
    }

    #[test]
    fn existing_log_is_truncated() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ready_layout(&tmp.path().join("app"));
        let log_path = layout.log_dir.join("echo.log");
        fs::write(&log_path, "stale output from a previous run\n").unwrap();

        let mut handle = spawn_detached(&layout, &service("sh", &["-c", "echo fresh"])).unwrap();
        handle.child.wait().unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "fresh\n");
    }

    #[test]
    fn returns_without_waiting() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ready_layout(&tmp.path().join("app"));

        let mut handle = spawn_detached(&layout, &service("sleep", &["5"])).unwrap();
        assert!(handle.child.try_wait().unwrap().is_none(), "child should still run");
        assert!(handle.pid > 0);

        handle.child.kill().unwrap();
        handle.child.wait().unwrap();
    }

    #[test]
    fn missing_program_is_launch_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ready_layout(&tmp.path().join("app"));

        let err = spawn_detached(&layout, &service("definitely-not-a-real-binary-7f3a", &[]))
            .unwrap_err();
        match err {
            BootError::LaunchFailed { service, source, .. } => {
                assert_eq!(service, "echo");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected LaunchFailed, got {:?}", other),
        }
    }

    #[test]
    fn missing_log_dir_is_open_log_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(&tmp.path().join("never-created"), &Config::default());

        let err = spawn_detached(&layout, &service("true", &[])).unwrap_err();
        assert!(matches!(err, BootError::OpenLog { .. }));
    }
}
