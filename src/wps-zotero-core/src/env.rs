//! Host environment detection and install-path derivation.
//!
//! WPS loads js add-ins from a per-user `jsaddons` directory; each installed
//! version lives in its own `wps-zotero_<version>` folder. The helper script
//! ships inside that folder, so everything the supervisor launches is
//! derived from the path computed here.

use crate::{APP_NAME, PROXY_SCRIPT};
use directories::BaseDirs;
use std::fmt;
use thiserror::Error;

const WINDOWS_JSADDONS: &str = "\\kingsoft\\wps\\jsaddons";
const POSIX_JSADDONS: &str = "/.local/share/Kingsoft/wps/jsaddons";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentDetectionError {
    #[error("failed to query {what} from the host: {message}")]
    Query { what: &'static str, message: String },
    #[error("the host reported an empty {0}")]
    MissingRoot(&'static str),
}

/// Filesystem-root queries answered by the host application.
///
/// A non-empty program-data path identifies the backslash-path platform.
pub trait HostEnvironment {
    fn program_data_path(&self) -> Result<String, EnvironmentDetectionError>;
    fn app_data_path(&self) -> Result<String, EnvironmentDetectionError>;
    fn home_path(&self) -> Result<String, EnvironmentDetectionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Posix => '/',
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Posix => f.write_str("posix"),
        }
    }
}

/// Result of platform detection: the platform plus the root the default
/// install path hangs off (app-data on Windows, home elsewhere).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub root: String,
}

impl PlatformInfo {
    pub fn windows(app_data_root: impl Into<String>) -> Self {
        Self {
            platform: Platform::Windows,
            root: app_data_root.into(),
        }
    }

    pub fn posix(home_root: impl Into<String>) -> Self {
        Self {
            platform: Platform::Posix,
            root: home_root.into(),
        }
    }

    pub fn detect(host: &dyn HostEnvironment) -> Result<Self, EnvironmentDetectionError> {
        let program_data = host.program_data_path()?;
        let (platform, root, what) = if program_data.trim().is_empty() {
            (Platform::Posix, host.home_path()?, "home path")
        } else {
            (Platform::Windows, host.app_data_path()?, "app-data path")
        };
        if root.trim().is_empty() {
            return Err(EnvironmentDetectionError::MissingRoot(what));
        }
        tracing::debug!(%platform, root = %root, "Detected host platform");
        Ok(Self { platform, root })
    }
}

/// Install directory of the running add-in version. Computed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPath {
    path: String,
    separator: char,
}

impl InstallPath {
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Path of the helper's entry script inside the install directory.
    pub fn proxy_script(&self) -> String {
        format!("{}{}{}", self.path, self.separator, PROXY_SCRIPT)
    }
}

impl fmt::Display for InstallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Derive the install directory for `version_tag`.
///
/// A non-empty override wins on every platform and keeps its own separator
/// style. Trailing `/` or `\` on the override are dropped before joining, so
/// `/opt/addon/` and `/opt/addon` give the same path. Without an override the
/// path follows the WPS `jsaddons` layout of the detected platform.
pub fn resolve(info: &PlatformInfo, version_tag: &str, override_root: Option<&str>) -> InstallPath {
    let folder = format!("{APP_NAME}_{version_tag}");

    if let Some(root) = override_root.filter(|root| !root.trim().is_empty()) {
        let separator = override_separator(root, info.platform);
        let root = root.trim_end_matches(['/', '\\']);
        return InstallPath {
            path: format!("{root}{separator}{folder}"),
            separator,
        };
    }

    match info.platform {
        Platform::Windows => InstallPath {
            path: format!(
                "{}{WINDOWS_JSADDONS}\\{folder}",
                info.root.replace('/', "\\")
            ),
            separator: '\\',
        },
        Platform::Posix => InstallPath {
            path: format!("{}{POSIX_JSADDONS}/{folder}", info.root),
            separator: '/',
        },
    }
}

fn override_separator(root: &str, platform: Platform) -> char {
    let has_forward = root.contains('/');
    let has_back = root.contains('\\');
    match (has_forward, has_back) {
        (true, false) => '/',
        (false, true) => '\\',
        _ => platform.separator(),
    }
}

/// Answers the root queries for the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl SystemEnvironment {
    fn base_dirs(what: &'static str) -> Result<BaseDirs, EnvironmentDetectionError> {
        BaseDirs::new().ok_or_else(|| EnvironmentDetectionError::Query {
            what,
            message: "no home directory for the current user".to_string(),
        })
    }
}

impl HostEnvironment for SystemEnvironment {
    fn program_data_path(&self) -> Result<String, EnvironmentDetectionError> {
        if cfg!(windows) {
            std::env::var("ProgramData").map_err(|err| EnvironmentDetectionError::Query {
                what: "program-data path",
                message: err.to_string(),
            })
        } else {
            Ok(String::new())
        }
    }

    fn app_data_path(&self) -> Result<String, EnvironmentDetectionError> {
        let dirs = Self::base_dirs("app-data path")?;
        Ok(dirs.config_dir().to_string_lossy().into_owned())
    }

    fn home_path(&self) -> Result<String, EnvironmentDetectionError> {
        let dirs = Self::base_dirs("home path")?;
        Ok(dirs.home_dir().to_string_lossy().into_owned())
    }
}
