//! One-shot helper start-up for a host session.

use crate::launch::{LaunchStrategy, ProcessSpawner};
use thiserror::Error;
use wps_zotero_core::InstallPath;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to start the proxy helper `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A start was already attempted this session; nothing was spawned.
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperState {
    NotStarted,
    Started,
    /// The spawn failed; commands will find the helper unreachable.
    Failed,
}

/// Starts the helper at most once and remembers the outcome.
pub struct ProcessSupervisor {
    spawner: Box<dyn ProcessSpawner>,
    state: HelperState,
}

impl ProcessSupervisor {
    pub fn new(spawner: Box<dyn ProcessSpawner>) -> Self {
        Self {
            spawner,
            state: HelperState::NotStarted,
        }
    }

    pub fn state(&self) -> HelperState {
        self.state
    }

    /// Spawn the helper unless a start was already attempted.
    ///
    /// A failed attempt also counts: the session stays degraded rather than
    /// respawning on every repeated load callback.
    pub fn start_once(
        &mut self,
        strategy: &LaunchStrategy,
        install: &InstallPath,
        interpreter: Option<&str>,
    ) -> Result<StartOutcome, SupervisorError> {
        if self.state != HelperState::NotStarted {
            tracing::debug!(state = ?self.state, "Helper start already attempted");
            return Ok(StartOutcome::AlreadyStarted);
        }

        let script = install.proxy_script();
        let request = strategy.request(&script, interpreter);
        tracing::info!(
            program = %request.program,
            script = %script,
            "Starting proxy helper"
        );

        match self.spawner.spawn(&request) {
            Ok(()) => {
                self.state = HelperState::Started;
                Ok(StartOutcome::Started)
            }
            Err(source) => {
                self.state = HelperState::Failed;
                tracing::error!(program = %request.program, error = %source, "Proxy helper failed to start");
                Err(SupervisorError::Spawn {
                    program: request.program,
                    source,
                })
            }
        }
    }
}
