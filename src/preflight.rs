// ABOUTME: Preflight checks run before any service is spawned.
// ABOUTME: Verifies each enabled service's executable is on PATH and its script exists.

use std::path::PathBuf;

use crate::config::ServiceSpec;
use crate::error::BootError;
use crate::layout::Layout;

/// What preflight found for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub service: String,
    pub program: String,
    pub executable: PathBuf,
}

/// Check every service in order, stopping at the first failure.
pub fn check<'a>(
    layout: &Layout,
    services: impl IntoIterator<Item = &'a ServiceSpec>,
) -> Result<Vec<Resolved>, BootError> {
    let mut resolved = Vec::new();
    for service in services {
        resolved.push(check_service(layout, service)?);
    }
    Ok(resolved)
}

/// Resolve one service's executable and verify its script.
pub fn check_service(layout: &Layout, service: &ServiceSpec) -> Result<Resolved, BootError> {
    // Programs given as paths are looked up relative to the base dir, bare names on PATH.
    let executable = which::which_in(
        &service.program,
        std::env::var_os("PATH"),
        &layout.base_dir,
    )
    .map_err(|_| BootError::ExecutableNotFound {
        service: service.name.clone(),
        program: service.program.clone(),
    })?;

    if let Some(script) = layout.script_path(service) {
        if !script.is_file() {
            return Err(BootError::MissingScript {
                service: service.name.clone(),
                path: script,
            });
        }
    }

    tracing::debug!(service = %service.name, executable = %executable.display(), "preflight ok");
    Ok(Resolved {
        service: service.name.clone(),
        program: service.program.clone(),
        executable,
    })
}
