//! Pure state-mutation reducers for the Beltane sequencer.
//!
//! These functions are the single source of truth for action → state mutations.
//!
//! Reducers are pure: they mutate `SessionState` only.
//! They do NOT:
//! - Construct DispatchResult
//! - Push undo snapshots
//! - Log
//! - Touch the clipboard or the transport cursor

mod arrangement;
mod automation;
mod note;
mod selection;
mod transport;

use crate::{Action, CreatedId, SessionState};

/// What a reducer did with an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduced {
    /// State was mutated
    Changed,
    /// State was mutated and a new entity was allocated
    Created(CreatedId),
    /// The action named an id that does not exist, or carried a NaN or
    /// infinite number; state is untouched
    Stale,
    /// Not a session mutation (clipboard, playback control, undo/redo)
    NotReducible,
}

impl Reduced {
    pub(crate) fn from_bool(changed: bool) -> Self {
        if changed {
            Reduced::Changed
        } else {
            Reduced::Stale
        }
    }

    pub(crate) fn created_or_stale(id: Option<CreatedId>) -> Self {
        id.map_or(Reduced::Stale, Reduced::Created)
    }

    pub fn is_change(self) -> bool {
        matches!(self, Reduced::Changed | Reduced::Created(_))
    }
}

/// Check whether an action is a pure session mutation.
/// Clipboard, playback control and undo/redo need state the session does
/// not own.
pub fn is_reducible(action: &Action) -> bool {
    match action {
        Action::Track(_)
        | Action::Clip(_)
        | Action::Instance(_)
        | Action::Note(_)
        | Action::Automation(_)
        | Action::Environment(_)
        | Action::Selection(_) => true,
        Action::Transport(a) => !a.is_playback_control(),
        Action::Clipboard(_) | Action::Undo | Action::Redo => false,
    }
}

/// Apply an action's state mutations to the session.
pub fn reduce_action(action: &Action, session: &mut SessionState) -> Reduced {
    match action {
        Action::Track(a) => arrangement::reduce_track(a, &mut session.arrangement),
        Action::Clip(a) => arrangement::reduce_clip(a, &mut session.arrangement),
        Action::Instance(a) => arrangement::reduce_instance(a, &mut session.arrangement),
        Action::Note(a) => note::reduce(a, &mut session.arrangement),
        Action::Automation(a) => automation::reduce(a, &mut session.arrangement),
        Action::Environment(a) => automation::reduce_environment(a, &mut session.arrangement),
        Action::Selection(a) => selection::reduce(a, session),
        Action::Transport(a) => transport::reduce(a, &mut session.transport),
        Action::Clipboard(_) | Action::Undo | Action::Redo => Reduced::NotReducible,
    }
}
