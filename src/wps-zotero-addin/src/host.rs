//! UI capabilities the host offers to the add-in.

/// Blocking modal dialogs of the host.
pub trait HostUi {
    fn alert(&self, message: &str);
    /// Yes/no question; `true` when the user accepts.
    fn confirm(&self, message: &str) -> bool;
}

/// Descriptor the ribbon passes to action and image callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: String,
}

impl Control {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

pub(crate) fn alert_prefixed(ui: &dyn HostUi, message: &str) {
    ui.alert(&format!("WPS-Zotero: {message}"));
}
