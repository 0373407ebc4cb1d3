//! Ribbon-facing half of the WPS-Zotero add-in.
//!
//! The host drives everything through three callbacks on [`Session`]:
//! - `on_load` detects the environment, starts the proxy helper once and
//!   hooks the helper's shutdown to the host's quit event
//! - `on_action` dispatches a ribbon control to its Zotero command, holding
//!   the integration binding in a [`HandleRegistry`] that releases it before
//!   the callback returns
//! - `get_image` maps a control to its icon
//!
//! # Usage
//!
//! ```rust,ignore
//! use wps_zotero_addin::{Control, HostBindings, Session};
//! use wps_zotero_core::{Config, SystemEnvironment};
//! use wps_zotero_supervisor::CommandSpawner;
//!
//! let mut session = Session::new(
//!     Config::default(),
//!     HostBindings {
//!         ui: Box::new(host_dialogs),
//!         environment: Box::new(SystemEnvironment),
//!         spawner: Box::new(CommandSpawner),
//!         connector: Box::new(zotero_client_factory),
//!     },
//! );
//! session.on_load(&mut quit_events);
//! session.on_action(&Control::new("btnAddEditCitation"));
//! ```

pub mod action;
mod connector;
mod dispatch;
mod host;
mod registry;
mod session;

pub use action::{image_for, ControlAction, IntegrationCommand, DEFAULT_IMAGE};
pub use connector::{CommandError, Connector, IntegrationClient, ProbingConnector};
pub use dispatch::{about_text, DispatchOutcome, Dispatcher, EXPORT_PROMPT};
pub use host::{Control, HostUi};
pub use registry::HandleRegistry;
pub use session::{HostBindings, ResolvedEnvironment, Session};
