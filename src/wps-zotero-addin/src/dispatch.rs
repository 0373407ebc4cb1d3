//! Ribbon action dispatch.

use crate::action::{ControlAction, IntegrationCommand};
use crate::connector::{CommandError, Connector};
use crate::host::{alert_prefixed, HostUi};
use crate::registry::HandleRegistry;
use wps_zotero_core::VERSION;

pub const EXPORT_PROMPT: &str = "Convert this document to a format for other word processors to import from? You may want to make a backup first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Unknown control id.
    Ignored,
    Completed,
    /// The user answered "no" to a confirmation.
    Declined,
    /// The command failed and the user was told.
    Failed,
}

pub fn about_text() -> String {
    format!(
        "WPS-Zotero ({VERSION})\n\n\
         This add-on is licensed under GPL-3.0: <http://www.gnu.org/licenses/>, it comes with no warranty.\n\n\
         Author: Tang, Kewei\n\
         https://github.com/tankwyn/WPS-Zotero"
    )
}

pub struct Dispatcher<'a> {
    connector: &'a dyn Connector,
    ui: &'a dyn HostUi,
}

impl<'a> Dispatcher<'a> {
    pub fn new(connector: &'a dyn Connector, ui: &'a dyn HostUi) -> Self {
        Self { connector, ui }
    }

    pub fn dispatch(&self, control_id: &str) -> DispatchOutcome {
        let Some(action) = ControlAction::from_control_id(control_id) else {
            tracing::trace!(control_id, "Ignoring unknown control");
            return DispatchOutcome::Ignored;
        };
        tracing::info!(control_id, action = ?action, "Dispatching ribbon action");

        let result = match action {
            ControlAction::About => {
                self.ui.alert(&about_text());
                return DispatchOutcome::Completed;
            }
            ControlAction::Export => {
                if !self.ui.confirm(EXPORT_PROMPT) {
                    tracing::info!("Export declined");
                    return DispatchOutcome::Declined;
                }
                self.run(|registry| registry.with_binding(|client| client.export_document()))
            }
            ControlAction::Refresh => self.run(|registry| {
                registry.with_binding(|client| client.import_document())?;
                // Import does not register the fields on its own binding.
                registry.clear();
                registry.with_binding(|client| client.command(IntegrationCommand::Refresh))
            }),
            other => match other.integration_command() {
                Some(command) => {
                    self.run(|registry| registry.with_binding(|client| client.command(command)))
                }
                None => Ok(()),
            },
        };

        match result {
            Ok(()) => DispatchOutcome::Completed,
            Err(err) => {
                tracing::error!(control_id, error = %err, "Ribbon action failed");
                alert_prefixed(self.ui, &err.to_string());
                DispatchOutcome::Failed
            }
        }
    }

    // The registry is dropped, releasing every binding, before the result
    // reaches the caller.
    fn run(
        &self,
        body: impl FnOnce(&mut HandleRegistry<'_>) -> Result<(), CommandError>,
    ) -> Result<(), CommandError> {
        let mut registry = HandleRegistry::new(self.connector);
        body(&mut registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::IntegrationClient;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeUi {
        alerts: RefCell<Vec<String>>,
        confirm_answer: Cell<bool>,
        confirms: Cell<usize>,
    }

    impl HostUi for FakeUi {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, _message: &str) -> bool {
            self.confirms.set(self.confirms.get() + 1);
            self.confirm_answer.get()
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeClient {
        id: usize,
        log: Log,
        fail: bool,
    }

    impl FakeClient {
        fn record(&self, what: &str) -> Result<(), CommandError> {
            self.log.borrow_mut().push(format!("{what}@{}", self.id));
            if self.fail {
                Err(CommandError::Integration(format!("{what} failed")))
            } else {
                Ok(())
            }
        }
    }

    impl IntegrationClient for FakeClient {
        fn command(&mut self, command: IntegrationCommand) -> Result<(), CommandError> {
            self.record(command.as_str())
        }

        fn import_document(&mut self) -> Result<(), CommandError> {
            self.record("import")
        }

        fn export_document(&mut self) -> Result<(), CommandError> {
            self.record("export")
        }
    }

    impl Drop for FakeClient {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("release@{}", self.id));
        }
    }

    #[derive(Default)]
    struct FakeConnector {
        log: Log,
        connects: Cell<usize>,
        fail_calls: bool,
    }

    impl Connector for FakeConnector {
        fn connect(&self) -> Result<Box<dyn IntegrationClient>, CommandError> {
            let id = self.connects.get() + 1;
            self.connects.set(id);
            self.log.borrow_mut().push(format!("acquire@{id}"));
            Ok(Box::new(FakeClient {
                id,
                log: self.log.clone(),
                fail: self.fail_calls,
            }))
        }
    }

    fn log_of(connector: &FakeConnector) -> Vec<String> {
        connector.log.borrow().clone()
    }

    #[test]
    fn simple_actions_send_their_command() {
        let cases = [
            ("btnAddEditCitation", "addEditCitation"),
            ("btnAddEditBib", "addEditBibliography"),
            ("btnPref", "setDocPrefs"),
            ("btnUnlink", "removeCodes"),
            ("btnAddNote", "addNote"),
        ];
        for (id, command) in cases {
            let connector = FakeConnector::default();
            let ui = FakeUi::default();
            let outcome = Dispatcher::new(&connector, &ui).dispatch(id);
            assert_eq!(outcome, DispatchOutcome::Completed);
            assert_eq!(
                log_of(&connector),
                vec![
                    "acquire@1".to_string(),
                    format!("{command}@1"),
                    "release@1".to_string()
                ]
            );
        }
    }

    #[test]
    fn refresh_uses_two_bindings() {
        let connector = FakeConnector::default();
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnRefresh");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(
            log_of(&connector),
            vec![
                "acquire@1",
                "import@1",
                "release@1",
                "acquire@2",
                "refresh@2",
                "release@2"
            ]
        );
    }

    #[test]
    fn failing_command_releases_and_alerts() {
        let connector = FakeConnector {
            fail_calls: true,
            ..FakeConnector::default()
        };
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnAddEditCitation");

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(
            log_of(&connector),
            vec!["acquire@1", "addEditCitation@1", "release@1"]
        );
        let alerts = ui.alerts.borrow();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0], "WPS-Zotero: addEditCitation failed");
    }

    #[test]
    fn failed_import_skips_refresh() {
        let connector = FakeConnector {
            fail_calls: true,
            ..FakeConnector::default()
        };
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnRefresh");
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(log_of(&connector), vec!["acquire@1", "import@1", "release@1"]);
    }

    #[test]
    fn declined_export_touches_nothing() {
        let connector = FakeConnector::default();
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnExport");
        assert_eq!(outcome, DispatchOutcome::Declined);
        assert_eq!(ui.confirms.get(), 1);
        assert_eq!(connector.connects.get(), 0);
        assert!(log_of(&connector).is_empty());
        assert!(ui.alerts.borrow().is_empty());
    }

    #[test]
    fn accepted_export_runs_in_a_scope() {
        let connector = FakeConnector::default();
        let ui = FakeUi::default();
        ui.confirm_answer.set(true);
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnExport");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(log_of(&connector), vec!["acquire@1", "export@1", "release@1"]);
    }

    #[test]
    fn about_shows_version_without_binding() {
        let connector = FakeConnector::default();
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnAbout");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(connector.connects.get(), 0);
        let alerts = ui.alerts.borrow();
        assert!(alerts[0].starts_with(&format!("WPS-Zotero ({VERSION})")));
        assert!(alerts[0].contains("GPL-3.0"));
    }

    #[test]
    fn unknown_control_is_ignored() {
        let connector = FakeConnector::default();
        let ui = FakeUi::default();
        let outcome = Dispatcher::new(&connector, &ui).dispatch("btnFromTheFuture");
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(connector.connects.get(), 0);
        assert!(ui.alerts.borrow().is_empty());
    }
}
