pub mod config;
pub mod env;
pub mod logging;
pub mod paths;

pub use config::{AddinConfig, Config, ConfigError, LogLevel, LoggingConfig, ProxyConfig, ValidationError};
pub use env::{
    resolve, EnvironmentDetectionError, HostEnvironment, InstallPath, Platform, PlatformInfo,
    SystemEnvironment,
};
pub use logging::{init_logging, LoggingError, LoggingGuard, LOG_ENV_VAR};
pub use paths::{AppDirs, DirsError};

pub const APP_NAME: &str = "wps-zotero";
pub const APP_AUTHOR: &str = "wps-zotero";
pub const APP_QUALIFIER: &str = "org";

/// Version tag baked into the install directory name (`wps-zotero_<VERSION>`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry script of the helper, relative to the install directory.
pub const PROXY_SCRIPT: &str = "proxy.py";
/// Loopback port the helper listens on.
pub const PROXY_PORT: u16 = 21931;
