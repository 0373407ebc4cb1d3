//! Seam to the Zotero integration client that lives on the document side.
//!
//! A binding is one integration client instance. It holds references to
//! host document objects (document, selection, fields) for as long as it
//! lives, so bindings are only ever owned by a
//! [`HandleRegistry`](crate::registry::HandleRegistry).

use crate::action::IntegrationCommand;
use thiserror::Error;
use wps_zotero_supervisor::{HelperProbe, ProbeError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot reach the Zotero proxy, please restart WPS ({0})")]
    HelperUnreachable(String),
    #[error("Zotero is not running, please start it first")]
    ZoteroNotRunning,
    #[error("{0}")]
    Integration(String),
}

impl From<ProbeError> for CommandError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::ZoteroNotRunning => CommandError::ZoteroNotRunning,
            other => CommandError::HelperUnreachable(other.to_string()),
        }
    }
}

pub trait IntegrationClient {
    fn command(&mut self, command: IntegrationCommand) -> Result<(), CommandError>;
    /// Register the fields already present in the document.
    fn import_document(&mut self) -> Result<(), CommandError>;
    /// Convert the document to the transfer format.
    fn export_document(&mut self) -> Result<(), CommandError>;
}

/// Opens new bindings.
pub trait Connector {
    fn connect(&self) -> Result<Box<dyn IntegrationClient>, CommandError>;
}

/// Pings the helper before handing out a binding, so a dead helper fails
/// fast instead of hanging the host's UI thread.
pub struct ProbingConnector {
    inner: Box<dyn Connector>,
    probe: HelperProbe,
}

impl ProbingConnector {
    pub fn new(inner: Box<dyn Connector>, probe: HelperProbe) -> Self {
        Self { inner, probe }
    }
}

impl Connector for ProbingConnector {
    fn connect(&self) -> Result<Box<dyn IntegrationClient>, CommandError> {
        self.probe.ping().map_err(|err| {
            tracing::warn!(url = self.probe.url(), error = %err, "Helper probe failed");
            CommandError::from(err)
        })?;
        self.inner.connect()
    }
}
