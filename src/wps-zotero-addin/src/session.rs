//! Session context handed to every host callback.

use crate::action::image_for;
use crate::connector::{Connector, ProbingConnector};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::host::{alert_prefixed, Control, HostUi};
use std::path::PathBuf;
use wps_zotero_core::{
    resolve, Config, EnvironmentDetectionError, HostEnvironment, InstallPath, Platform,
    PlatformInfo, VERSION,
};
use wps_zotero_supervisor::{
    interpreter, register_shutdown_hook, HelperProbe, HelperState, LaunchStrategy, ProcessSpawner,
    ProcessSupervisor, QuitNotifier, StopEndpoint,
};

/// Host capabilities the add-in is wired to.
pub struct HostBindings {
    pub ui: Box<dyn HostUi>,
    pub environment: Box<dyn HostEnvironment>,
    pub spawner: Box<dyn ProcessSpawner>,
    pub connector: Box<dyn Connector>,
}

/// Everything derived from the host environment on first load.
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    pub platform: PlatformInfo,
    pub install_path: InstallPath,
    pub strategy: LaunchStrategy,
    pub interpreter: Option<String>,
}

impl ResolvedEnvironment {
    /// Query the host once and derive the install path and launch plan.
    pub fn detect(
        environment: &dyn HostEnvironment,
        config: &Config,
    ) -> Result<Self, EnvironmentDetectionError> {
        Self::detect_with(environment, config, interpreter::discover)
    }

    /// A configured interpreter always wins; `discover` runs only when none
    /// is configured and `addin.discover_interpreter` is set.
    fn detect_with(
        environment: &dyn HostEnvironment,
        config: &Config,
        discover: impl FnOnce(Platform) -> Option<PathBuf>,
    ) -> Result<Self, EnvironmentDetectionError> {
        let platform = PlatformInfo::detect(environment)?;
        let install_path = resolve(&platform, VERSION, config.addin.install_root());
        let strategy =
            LaunchStrategy::for_platform(platform.platform, config.addin.prefer_windowless);
        let interpreter = match config.addin.interpreter() {
            Some(path) => Some(path.to_string()),
            None if config.addin.discover_interpreter => {
                discover(platform.platform).map(|path| path.to_string_lossy().into_owned())
            }
            None => None,
        };
        Ok(Self {
            platform,
            install_path,
            strategy,
            interpreter,
        })
    }
}

/// State of one host-application run.
///
/// Created before the host's load callback and dropped when the host exits.
/// The helper is started at most once per `Session`, however often the host
/// calls [`Session::on_load`].
pub struct Session {
    config: Config,
    ui: Box<dyn HostUi>,
    environment: Box<dyn HostEnvironment>,
    connector: Box<dyn Connector>,
    supervisor: ProcessSupervisor,
    resolved: Option<ResolvedEnvironment>,
    shutdown_hooked: bool,
}

impl Session {
    pub fn new(config: Config, host: HostBindings) -> Self {
        let connector = if config.proxy.probe_before_connect {
            wrap_with_probe(host.connector, &config)
        } else {
            host.connector
        };
        Self {
            config,
            ui: host.ui,
            environment: host.environment,
            connector,
            supervisor: ProcessSupervisor::new(host.spawner),
            resolved: None,
            shutdown_hooked: false,
        }
    }

    /// Load callback. Returns `false` only when the environment cannot be
    /// detected; a helper that fails to start leaves the session degraded.
    pub fn on_load(&mut self, quit: &mut dyn QuitNotifier) -> bool {
        if self.resolved.is_none() {
            match ResolvedEnvironment::detect(self.environment.as_ref(), &self.config) {
                Ok(resolved) => {
                    tracing::info!(
                        platform = %resolved.platform.platform,
                        install_path = %resolved.install_path,
                        "WPS-Zotero loaded"
                    );
                    self.resolved = Some(resolved);
                }
                Err(err) => {
                    tracing::error!(error = %err, "Host environment detection failed");
                    alert_prefixed(self.ui.as_ref(), &err.to_string());
                    return false;
                }
            }
        }
        let Some(resolved) = self.resolved.as_ref() else {
            return false;
        };

        if let Err(err) = self.supervisor.start_once(
            &resolved.strategy,
            &resolved.install_path,
            resolved.interpreter.as_deref(),
        ) {
            alert_prefixed(self.ui.as_ref(), &err.to_string());
        }

        if !self.shutdown_hooked {
            register_shutdown_hook(quit, StopEndpoint::from_config(&self.config.proxy));
            self.shutdown_hooked = true;
        }
        true
    }

    /// Action callback; always acknowledges the event.
    pub fn on_action(&mut self, control: &Control) -> bool {
        let outcome = self.dispatch(&control.id);
        tracing::debug!(control_id = %control.id, outcome = ?outcome, "Action handled");
        true
    }

    pub fn dispatch(&self, control_id: &str) -> DispatchOutcome {
        Dispatcher::new(self.connector.as_ref(), self.ui.as_ref()).dispatch(control_id)
    }

    /// Image callback.
    pub fn get_image(&self, control: &Control) -> &'static str {
        image_for(&control.id)
    }

    pub fn resolved(&self) -> Option<&ResolvedEnvironment> {
        self.resolved.as_ref()
    }

    pub fn helper_state(&self) -> HelperState {
        self.supervisor.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn wrap_with_probe(connector: Box<dyn Connector>, config: &Config) -> Box<dyn Connector> {
    match HelperProbe::new(&config.proxy) {
        Ok(probe) => Box::new(ProbingConnector::new(connector, probe)),
        Err(err) => {
            tracing::warn!(error = %err, "Helper probe unavailable, connecting without it");
            connector
        }
    }
}
