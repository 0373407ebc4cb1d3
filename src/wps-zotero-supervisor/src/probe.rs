//! Bounded-timeout reachability check of the helper.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use wps_zotero_core::ProxyConfig;

/// Zotero connector endpoint; the helper forwards it to Zotero.
pub const PING_PATH: &str = "/connector/ping";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("the Zotero proxy at {url} is unreachable: {source}")]
    Unreachable { url: String, source: reqwest::Error },
    #[error("Zotero is not running")]
    ZoteroNotRunning,
    #[error("the Zotero proxy answered with status {0}")]
    Status(StatusCode),
}

pub struct HelperProbe {
    client: Client,
    url: String,
}

impl HelperProbe {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .map_err(ProbeError::Client)?;
        Ok(Self {
            client,
            url: format!("{}{PING_PATH}", config.base_url()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Succeeds when both the helper and Zotero behind it answer.
    pub fn ping(&self) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|source| ProbeError::Unreachable {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            // The helper answers 503 itself when it cannot reach Zotero.
            Err(ProbeError::ZoteroNotRunning)
        } else {
            Err(ProbeError::Status(status))
        }
    }
}
