//! Platform launch strategies and the process-spawn seam.

use crate::interpreter::{self, POSIX_DEFAULT_INTERPRETER, WINDOWS_DEFAULT_INTERPRETER};
use std::io;
use std::process::{Command, Stdio};
use wps_zotero_core::Platform;

/// How the spawned program relates to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    /// The program is the helper itself; start it detached and windowless.
    Detached,
    /// The program is a shell that backgrounds the helper and exits at once.
    ShellBackground,
}

/// One process launch, as handed to a [`ProcessSpawner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub mode: SpawnMode,
}

/// Process-spawn capability of the host.
pub trait ProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsLauncher {
    pub prefer_windowless: bool,
}

impl WindowsLauncher {
    fn request(&self, script: &str, interpreter: Option<&str>) -> SpawnRequest {
        let program = match interpreter {
            Some(path) if self.prefer_windowless => interpreter::prefer_windowless(path),
            Some(path) => path.to_string(),
            None => WINDOWS_DEFAULT_INTERPRETER.to_string(),
        };
        SpawnRequest {
            program,
            args: vec![script.to_string()],
            mode: SpawnMode::Detached,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosixLauncher;

impl PosixLauncher {
    fn request(&self, script: &str, interpreter: Option<&str>) -> SpawnRequest {
        let python = interpreter.unwrap_or(POSIX_DEFAULT_INTERPRETER);
        let job = format!(
            "nohup {} {} > /dev/null 2>&1 &",
            double_quote(python),
            double_quote(script)
        );
        SpawnRequest {
            program: "bash".to_string(),
            args: vec!["-c".to_string(), job],
            mode: SpawnMode::ShellBackground,
        }
    }
}

/// Launch strategy selected once from the detected platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    Windows(WindowsLauncher),
    Posix(PosixLauncher),
}

impl LaunchStrategy {
    pub fn for_platform(platform: Platform, prefer_windowless: bool) -> Self {
        match platform {
            Platform::Windows => LaunchStrategy::Windows(WindowsLauncher { prefer_windowless }),
            Platform::Posix => LaunchStrategy::Posix(PosixLauncher),
        }
    }

    /// Build the launch for `script`, using `interpreter` when configured.
    pub fn request(&self, script: &str, interpreter: Option<&str>) -> SpawnRequest {
        match self {
            LaunchStrategy::Windows(launcher) => launcher.request(script, interpreter),
            LaunchStrategy::Posix(launcher) => launcher.request(script, interpreter),
        }
    }
}

// Wrap in double quotes for bash, escaping the characters that stay special inside them.
fn double_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandSpawner;

impl ProcessSpawner for CommandSpawner {
    fn spawn(&self, request: &SpawnRequest) -> io::Result<()> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match request.mode {
            SpawnMode::Detached => {
                configure_detached(&mut cmd);
                let child = cmd.spawn()?;
                tracing::debug!(pid = child.id(), program = %request.program, "Spawned helper");
                Ok(())
            }
            SpawnMode::ShellBackground => {
                let status = cmd.status()?;
                if status.success() {
                    Ok(())
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("launcher shell exited with {status}"),
                    ))
                }
            }
        }
    }
}

#[cfg(windows)]
fn configure_detached(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_detached(_cmd: &mut Command) {}
