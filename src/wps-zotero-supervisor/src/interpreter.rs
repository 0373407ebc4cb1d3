//! Python interpreter selection for the helper.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use wps_zotero_core::Platform;

/// Interpreter used on Windows when nothing is configured; has no console window.
pub const WINDOWS_DEFAULT_INTERPRETER: &str = "pythonw.exe";
/// Interpreter used on posix hosts when nothing is configured.
pub const POSIX_DEFAULT_INTERPRETER: &str = "python3";

/// `...\python.exe` -> `...\pythonw.exe`, keeping the original casing of the
/// directory part. `None` when the path does not name a console interpreter.
pub fn windowless_sibling(interpreter: &str) -> Option<String> {
    if !interpreter.to_ascii_lowercase().ends_with("python.exe") {
        return None;
    }
    let stem = &interpreter[..interpreter.len() - ".exe".len()];
    Some(format!("{stem}w.exe"))
}

/// Upgrade a console interpreter to its windowless sibling when the sibling
/// exists on disk. Anything else is returned unchanged.
pub fn prefer_windowless(interpreter: &str) -> String {
    match windowless_sibling(interpreter) {
        Some(sibling) if Path::new(&sibling).is_file() => {
            tracing::debug!(from = interpreter, to = %sibling, "Using windowless interpreter");
            sibling
        }
        _ => interpreter.to_string(),
    }
}

fn candidates(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Windows => &["python.exe", "python3.exe"],
        Platform::Posix => &["python3", "python"],
    }
}

/// Every existing candidate executable on `path_var`, in search order.
pub fn find_candidates(path_var: &OsStr, platform: Platform) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for name in candidates(platform) {
        for dir in std::env::split_paths(path_var) {
            let candidate = dir.join(name);
            if candidate.is_file() && !found.contains(&candidate) {
                found.push(candidate);
            }
        }
    }
    found
}

/// Whether `interpreter --version` reports Python 3.
pub fn is_python3(interpreter: &Path) -> bool {
    let output = Command::new(interpreter)
        .arg("--version")
        .stdin(Stdio::null())
        .output();
    match output {
        Ok(output) => {
            // Python 2 printed its version on stderr.
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            text.contains("Python 3")
        }
        Err(err) => {
            tracing::debug!(interpreter = %interpreter.display(), error = %err, "Version check failed");
            false
        }
    }
}

/// Locate a Python 3 interpreter on the current `PATH`.
pub fn discover(platform: Platform) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let found = find_candidates(&path_var, platform)
        .into_iter()
        .find(|candidate| is_python3(candidate));
    match &found {
        Some(path) => tracing::info!(interpreter = %path.display(), "Discovered Python 3 interpreter"),
        None => tracing::warn!("No Python 3 interpreter found on PATH"),
    }
    found
}
