use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, SonarError};
use crate::models::{ScanInvocation, ScanMode};

pub const CONTAINER_SOURCE_DIR: &str = "/usr/src";
/// Mount point for a properties file that lives outside the project directory.
pub const CONTAINER_SETTINGS_DIR: &str = "/opt/sonarpipe/settings";
const CONTAINER_RUNTIME: &str = "docker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    pub mode: ScanMode,
    pub program: String,
    pub args: Vec<String>,
}

impl ScanCommand {
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn command_line(&self) -> String {
        self.argv().join(" ")
    }
}

/// Runs a planned scan to completion.
pub trait ScanRunner {
    fn run(&self, command: &ScanCommand) -> Result<ScanInvocation>;
}

/// Spawns the scanner as a child process with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessScanRunner;

impl ScanRunner for ProcessScanRunner {
    fn run(&self, command: &ScanCommand) -> Result<ScanInvocation> {
        invoke(command)
    }
}

#[must_use]
pub fn resolve_on_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Chooses the local scanner when `resolve` finds it, otherwise the container
/// image. The token stays in the properties file and is never put on the
/// command line.
#[must_use]
pub fn plan_scan<R>(config: &PipelineConfig, resolve: R) -> ScanCommand
where
    R: Fn(&str) -> Option<PathBuf>,
{
    let scan = &config.scan;
    let mut args = vec![
        format!("-Dsonar.host.url={}", config.service.host),
        format!("-Dsonar.projectKey={}", config.project.key),
    ];

    let command = if resolve(&scan.scanner_executable).is_some() {
        args.push(format!(
            "-Dsonar.projectBaseDir={}",
            scan.project_dir.display()
        ));
        args.push(format!(
            "-Dproject.settings={}",
            scan.properties_file.display()
        ));
        args.extend(scan.extra_args.iter().cloned());
        ScanCommand {
            mode: ScanMode::Local,
            program: scan.scanner_executable.clone(),
            args,
        }
    } else {
        let project_mount = absolute_or_raw(&scan.project_dir);
        let settings_file = absolute_or_raw(&scan.properties_file);
        let mut mounts = vec![format!(
            "{}:{CONTAINER_SOURCE_DIR}",
            project_mount.display()
        )];
        let settings_path = match settings_file.strip_prefix(&project_mount) {
            Ok(relative) => format!("{CONTAINER_SOURCE_DIR}/{}", relative.display()),
            Err(_) => {
                // Outside the project tree: mount its directory separately.
                let parent = settings_file.parent().unwrap_or_else(|| Path::new("."));
                let file_name = settings_file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                mounts.push(format!(
                    "{}:{CONTAINER_SETTINGS_DIR}:ro",
                    parent.display()
                ));
                format!("{CONTAINER_SETTINGS_DIR}/{file_name}")
            }
        };

        let mut container_args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--network".to_string(),
            "host".to_string(),
        ];
        for mount in mounts {
            container_args.push("-v".to_string());
            container_args.push(mount);
        }
        container_args.push(scan.container_image.clone());
        args.push(format!("-Dsonar.projectBaseDir={CONTAINER_SOURCE_DIR}"));
        args.push(format!("-Dproject.settings={settings_path}"));
        args.extend(scan.extra_args.iter().cloned());
        container_args.extend(args);
        ScanCommand {
            mode: ScanMode::Container,
            program: CONTAINER_RUNTIME.to_string(),
            args: container_args,
        }
    };
    info!(mode = command.mode.as_str(), program = %command.program, "scan planned");
    command
}

fn absolute_or_raw(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Runs `command` and records its exit status and wall-clock duration. A
/// non-zero exit is returned as data; only a spawn failure is an error.
pub fn invoke(command: &ScanCommand) -> Result<ScanInvocation> {
    info!(command = %command.command_line(), "starting scan");
    let started = Instant::now();
    let status = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|err| {
            warn!(program = %command.program, error = %err, "scanner failed to start");
            SonarError::ScanFailure {
                exit_code: None,
                command: command.command_line(),
            }
        })?;
    let duration_seconds = started.elapsed().as_secs_f64();
    let exit_code = status.code().unwrap_or(-1);
    info!(exit_code, duration_seconds, "scan finished");

    Ok(ScanInvocation {
        command: command.argv(),
        mode: command.mode,
        exit_code,
        duration_seconds,
    })
}
