//! Lifecycle of the WPS-Zotero proxy helper.
//!
//! The helper is a small Python HTTP proxy shipped inside the add-in's
//! install directory. It listens on `127.0.0.1:21931` and forwards the
//! add-in's requests to Zotero's connector port. This crate provides:
//! - Launch strategies for Windows (detached, windowless interpreter) and
//!   posix hosts (backgrounded shell job)
//! - A supervisor that starts the helper at most once per host session
//! - A quit hook that asks the helper to stop without blocking the host
//! - A bounded-timeout probe used before a command talks to the helper
//!
//! # Usage
//!
//! ```rust,ignore
//! use wps_zotero_core::{resolve, PlatformInfo, VERSION};
//! use wps_zotero_supervisor::{CommandSpawner, LaunchStrategy, ProcessSupervisor};
//!
//! let info = PlatformInfo::posix("/home/alice");
//! let install = resolve(&info, VERSION, None);
//! let strategy = LaunchStrategy::for_platform(info.platform, true);
//! let mut supervisor = ProcessSupervisor::new(Box::new(CommandSpawner));
//! supervisor.start_once(&strategy, &install, None)?;
//! ```

pub mod interpreter;
mod launch;
mod probe;
mod shutdown;
mod supervisor;

pub use launch::{
    CommandSpawner, LaunchStrategy, PosixLauncher, ProcessSpawner, SpawnMode, SpawnRequest,
    WindowsLauncher,
};
pub use probe::{HelperProbe, ProbeError, PING_PATH};
pub use shutdown::{
    register_shutdown_hook, request_stop, QuitNotifier, StopEndpoint, StopResult, STOP_PATH,
};
pub use supervisor::{HelperState, ProcessSupervisor, StartOutcome, SupervisorError};
