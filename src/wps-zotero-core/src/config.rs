use crate::paths::AppDirs;
use crate::PROXY_PORT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub addin: AddinConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            addin: AddinConfig::default(),
            proxy: ProxyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Operator overrides for where the add-in lives and what runs the helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddinConfig {
    /// Replaces the platform `jsaddons` directory (needed on macOS).
    #[serde(default)]
    pub install_root: Option<String>,
    /// Interpreter used to run the helper script.
    #[serde(default)]
    pub interpreter: Option<String>,
    /// Swap `python.exe` for a sibling `pythonw.exe` when one exists.
    #[serde(default = "default_true")]
    pub prefer_windowless: bool,
    /// Search `PATH` for an interpreter when none is configured.
    #[serde(default)]
    pub discover_interpreter: bool,
}

impl Default for AddinConfig {
    fn default() -> Self {
        Self {
            install_root: None,
            interpreter: None,
            prefer_windowless: default_true(),
            discover_interpreter: false,
        }
    }
}

impl AddinConfig {
    pub fn install_root(&self) -> Option<&str> {
        non_empty(self.install_root.as_deref())
    }

    pub fn interpreter(&self) -> Option<&str> {
        non_empty(self.interpreter.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_true")]
    pub probe_before_connect: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            timeout_ms: default_timeout_ms(),
            probe_before_connect: default_true(),
        }
    }
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default)]
    pub stdout: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stdout: false,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("proxy.port must be non-zero")]
    ZeroPort,
    #[error("proxy.timeout_ms must be non-zero")]
    ZeroTimeout,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        Self::load_from(&Self::config_path(dirs))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.proxy.port == 0 {
            return Err(ValidationError::ZeroPort);
        }
        if self.proxy.timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    PROXY_PORT
}

// Same as the helper's own socket timeout.
fn default_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.max_log_files, 7);
        assert!(!config.logging.stdout);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.proxy.base_url(), "http://127.0.0.1:21931");
        assert!(config.addin.prefer_windowless);
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = Config::default();
        config.proxy.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroPort));
    }

    #[test]
    fn empty_overrides_are_absent() {
        let mut addin = AddinConfig::default();
        addin.install_root = Some("   ".into());
        addin.interpreter = Some(String::new());
        assert_eq!(addin.install_root(), None);
        assert_eq!(addin.interpreter(), None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::from_root(tmp.path());
        let config = Config::load_or_default(&dirs).expect("defaults");
        assert_eq!(config.proxy.port, PROXY_PORT);
    }

    #[test]
    fn parses_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
config_version = 1

[addin]
install_root = "/opt/addon"
interpreter = "C:\\Python311\\python.exe"

[proxy]
timeout_ms = 1500

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).expect("config should parse");
        assert_eq!(config.addin.install_root(), Some("/opt/addon"));
        assert_eq!(config.addin.interpreter(), Some(r"C:\Python311\python.exe"));
        assert_eq!(config.proxy.timeout(), Duration::from_millis(1500));
        assert_eq!(config.proxy.port, PROXY_PORT);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn parse_error_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "config_version = \"one\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
