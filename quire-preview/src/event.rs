//! Events flowing from the editor and the host into an editor session

use quire_core::{TextSelection, ViewFlags};
use std::path::PathBuf;

use crate::surface::web::{LoadOutcome, LoadTicket};

/// Session events. Every state change reaches the session as exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The editor text was replaced
    TextChanged(String),
    /// The editor selection moved
    SelectionChanged(TextSelection),
    /// The editor scrolled vertically
    ScrollChanged(f64),
    /// The user toggled preview views
    FlagsChanged(ViewFlags),
    /// The document was saved under a new name (or lost its name)
    PathChanged(Option<PathBuf>),
    /// The editor tab became the active one
    Activated,
    /// The editor tab was hidden
    Deactivated,
    /// The web render target finished a load cycle
    LoadFinished(LoadTicket, LoadOutcome),
    /// The file changed on disk
    FileChanged,
}
