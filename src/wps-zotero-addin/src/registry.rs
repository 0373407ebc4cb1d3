//! Per-command ownership of integration bindings.
//!
//! The host keeps native references to every document object a binding
//! touches. A binding that outlives the ribbon event that created it keeps
//! those objects alive, and over a long editing session that degrades or
//! crashes WPS. A [`HandleRegistry`] is therefore created for exactly one
//! command and releases whatever it holds when it is dropped, on every exit
//! path of the command body.

use crate::connector::{CommandError, Connector, IntegrationClient};

pub struct HandleRegistry<'c> {
    connector: &'c dyn Connector,
    binding: Option<Box<dyn IntegrationClient>>,
    acquisitions: usize,
}

impl<'c> HandleRegistry<'c> {
    pub fn new(connector: &'c dyn Connector) -> Self {
        Self {
            connector,
            binding: None,
            acquisitions: 0,
        }
    }

    /// Run `f` against the current binding, connecting first if none is held.
    pub fn with_binding<R>(
        &mut self,
        f: impl FnOnce(&mut dyn IntegrationClient) -> Result<R, CommandError>,
    ) -> Result<R, CommandError> {
        let binding = match self.binding.take() {
            Some(binding) => binding,
            None => {
                let binding = self.connector.connect()?;
                self.acquisitions += 1;
                tracing::debug!(acquisition = self.acquisitions, "Acquired integration binding");
                binding
            }
        };
        let binding = self.binding.insert(binding);
        f(&mut **binding)
    }

    /// Drop the held binding, if any. Safe to call repeatedly.
    pub fn clear(&mut self) {
        if let Some(binding) = self.binding.take() {
            drop(binding);
            tracing::debug!(acquisition = self.acquisitions, "Released integration binding");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Number of bindings opened through this registry.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions
    }
}

impl Drop for HandleRegistry<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}
