//! Action types for the dispatch system, re-exported from beltane-types.

pub use beltane_types::{
    Action, AutomationAction, ClipAction, ClipboardAction, CreatedId, DispatchResult,
    EnvironmentAction, InstanceAction, NoteAction, SelectionAction, TrackAction, TransportAction,
};
