//! Ribbon control ids, the actions they trigger and their icons.

/// Icon for controls without a dedicated image.
pub const DEFAULT_IMAGE: &str = "images/default.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    AddEditCitation,
    AddEditBibliography,
    Refresh,
    DocumentPreferences,
    Export,
    RemoveCodes,
    AddNote,
    About,
}

/// Commands understood by the Zotero integration client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationCommand {
    AddEditCitation,
    AddEditBibliography,
    Refresh,
    SetDocPrefs,
    RemoveCodes,
    AddNote,
}

impl IntegrationCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationCommand::AddEditCitation => "addEditCitation",
            IntegrationCommand::AddEditBibliography => "addEditBibliography",
            IntegrationCommand::Refresh => "refresh",
            IntegrationCommand::SetDocPrefs => "setDocPrefs",
            IntegrationCommand::RemoveCodes => "removeCodes",
            IntegrationCommand::AddNote => "addNote",
        }
    }
}

impl ControlAction {
    pub const ALL: [ControlAction; 8] = [
        ControlAction::AddEditCitation,
        ControlAction::AddEditBibliography,
        ControlAction::Refresh,
        ControlAction::DocumentPreferences,
        ControlAction::Export,
        ControlAction::RemoveCodes,
        ControlAction::AddNote,
        ControlAction::About,
    ];

    pub fn from_control_id(id: &str) -> Option<Self> {
        let action = match id {
            "btnAddEditCitation" => ControlAction::AddEditCitation,
            "btnAddEditBib" => ControlAction::AddEditBibliography,
            "btnRefresh" => ControlAction::Refresh,
            "btnPref" => ControlAction::DocumentPreferences,
            "btnExport" => ControlAction::Export,
            "btnUnlink" => ControlAction::RemoveCodes,
            "btnAddNote" => ControlAction::AddNote,
            "btnAbout" => ControlAction::About,
            _ => return None,
        };
        Some(action)
    }

    pub fn control_id(&self) -> &'static str {
        match self {
            ControlAction::AddEditCitation => "btnAddEditCitation",
            ControlAction::AddEditBibliography => "btnAddEditBib",
            ControlAction::Refresh => "btnRefresh",
            ControlAction::DocumentPreferences => "btnPref",
            ControlAction::Export => "btnExport",
            ControlAction::RemoveCodes => "btnUnlink",
            ControlAction::AddNote => "btnAddNote",
            ControlAction::About => "btnAbout",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            ControlAction::AddEditCitation => "images/addEditCitation.svg",
            ControlAction::AddEditBibliography => "images/addEditBib.svg",
            ControlAction::Refresh => "images/refresh.svg",
            ControlAction::DocumentPreferences => "images/pref.svg",
            ControlAction::Export => "images/export.svg",
            ControlAction::RemoveCodes => "images/unlink.svg",
            ControlAction::AddNote => "images/addNote.svg",
            ControlAction::About => DEFAULT_IMAGE,
        }
    }

    /// The single integration command behind this action, if it is that simple.
    ///
    /// Refresh, Export and About have their own sequences.
    pub fn integration_command(&self) -> Option<IntegrationCommand> {
        match self {
            ControlAction::AddEditCitation => Some(IntegrationCommand::AddEditCitation),
            ControlAction::AddEditBibliography => Some(IntegrationCommand::AddEditBibliography),
            ControlAction::DocumentPreferences => Some(IntegrationCommand::SetDocPrefs),
            ControlAction::RemoveCodes => Some(IntegrationCommand::RemoveCodes),
            ControlAction::AddNote => Some(IntegrationCommand::AddNote),
            ControlAction::Refresh | ControlAction::Export | ControlAction::About => None,
        }
    }
}

/// Icon for a control id; unknown ids get [`DEFAULT_IMAGE`].
pub fn image_for(control_id: &str) -> &'static str {
    ControlAction::from_control_id(control_id)
        .map(|action| action.image())
        .unwrap_or(DEFAULT_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_icons() {
        let expected = [
            ("btnAddEditCitation", "images/addEditCitation.svg"),
            ("btnAddEditBib", "images/addEditBib.svg"),
            ("btnRefresh", "images/refresh.svg"),
            ("btnPref", "images/pref.svg"),
            ("btnAddNote", "images/addNote.svg"),
            ("btnUnlink", "images/unlink.svg"),
            ("btnExport", "images/export.svg"),
            ("btnAbout", "images/default.svg"),
        ];
        for (id, image) in expected {
            assert_eq!(image_for(id), image, "icon for {id}");
        }
    }

    #[test]
    fn unknown_control_gets_default_icon() {
        assert_eq!(image_for("btnSomethingNew"), DEFAULT_IMAGE);
        assert_eq!(image_for(""), DEFAULT_IMAGE);
    }

    #[test]
    fn control_ids_round_trip() {
        for action in ControlAction::ALL {
            assert_eq!(ControlAction::from_control_id(action.control_id()), Some(action));
        }
    }

    #[test]
    fn control_ids_are_case_sensitive() {
        assert_eq!(ControlAction::from_control_id("btnrefresh"), None);
    }

    #[test]
    fn simple_actions_name_their_command() {
        assert_eq!(
            ControlAction::DocumentPreferences
                .integration_command()
                .map(|c| c.as_str()),
            Some("setDocPrefs")
        );
        assert_eq!(ControlAction::Refresh.integration_command(), None);
    }
}
