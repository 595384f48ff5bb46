mod clipboard;
mod local;
mod transport;


pub use local::LocalDispatcher;

use beltane_types::reduce::{reduce_action, Reduced};
use beltane_types::{NoteSpec, TransportConfig};

use crate::action::{Action, AutomationAction, DispatchResult, InstanceAction, NoteAction};
use crate::state::undo::{coalesce_key, is_undoable};
use crate::state::AppState;

/// Dispatch an action. Returns a DispatchResult describing what the host
/// must refresh.
///
/// Undoable actions record a history step when, and only when, they change
/// the session. Edit times are snapped to the transport grid first.
pub fn dispatch_action(action: &Action, state: &mut AppState) -> DispatchResult {
    let result = match action {
        Action::Undo => dispatch_history(state, true),
        Action::Redo => dispatch_history(state, false),
        _ => {
            let snapped = snap_action(action, &state.session.transport);
            let action = snapped.as_ref().unwrap_or(action);

            let before = is_undoable(action).then(|| state.session.clone());

            let result = match action {
                Action::Clipboard(a) => clipboard::dispatch_clipboard(a, state),
                Action::Transport(a) if a.is_playback_control() => {
                    transport::dispatch_playback(a, state)
                }
                _ => dispatch_reducible(action, state),
            };

            if let Some(before) = before {
                if state.session != before {
                    state
                        .undo_history
                        .push_coalesced(&before, coalesce_key(action));
                }
            }
            result
        }
    };

    if result.layout_dirty {
        state.rebuild_layout();
    }
    result
}

fn dispatch_reducible(action: &Action, state: &mut AppState) -> DispatchResult {
    let created = match reduce_action(action, &mut state.session) {
        Reduced::Changed => None,
        Reduced::Created(id) => Some(id),
        Reduced::Stale => {
            log::debug!(target: "dispatch", "ignoring stale reference or non-finite value: {:?}", action);
            return DispatchResult::stale();
        }
        Reduced::NotReducible => return DispatchResult::none(),
    };

    // Deletes may have taken selected instances or the active clip with them
    let session = &mut state.session;
    session.selection.prune(&session.arrangement);

    DispatchResult {
        layout_dirty: action.affects_layout(),
        playback_dirty: action.affects_playback(),
        created,
        ..DispatchResult::none()
    }
}

fn dispatch_history(state: &mut AppState, undo: bool) -> DispatchResult {
    let applied = if undo {
        state.undo_history.undo(&mut state.session)
    } else {
        state.undo_history.redo(&mut state.session)
    };
    if !applied {
        return DispatchResult::none();
    }
    log::debug!(
        target: "undo",
        "{} ({} left, {} to redo)",
        if undo { "undo" } else { "redo" },
        state.undo_history.undo_depth(),
        state.undo_history.redo_depth()
    );
    DispatchResult {
        layout_dirty: true,
        playback_dirty: true,
        ..DispatchResult::none()
    }
}

/// A copy of `action` with its edit times snapped to the grid, or `None`
/// when nothing needs snapping.
fn snap_action(action: &Action, transport: &TransportConfig) -> Option<Action> {
    let snap = |t: f64| transport.snap_time(t);
    let snapped = match action {
        Action::Note(NoteAction::Add { clip_id, spec }) => Action::Note(NoteAction::Add {
            clip_id: *clip_id,
            spec: NoteSpec {
                start_time: snap(spec.start_time),
                ..spec.clone()
            },
        }),
        Action::Note(NoteAction::Move { clip_id, note_id, start_time }) => {
            Action::Note(NoteAction::Move {
                clip_id: *clip_id,
                note_id: *note_id,
                start_time: snap(*start_time),
            })
        }
        Action::Instance(InstanceAction::Place { clip_id, track_id, start_time }) => {
            Action::Instance(InstanceAction::Place {
                clip_id: *clip_id,
                track_id: *track_id,
                start_time: snap(*start_time),
            })
        }
        Action::Instance(InstanceAction::Move { instance_id, track_id, start_time }) => {
            Action::Instance(InstanceAction::Move {
                instance_id: *instance_id,
                track_id: *track_id,
                start_time: snap(*start_time),
            })
        }
        Action::Automation(AutomationAction::AddPoint { clip_id, param, time, value, easing }) => {
            Action::Automation(AutomationAction::AddPoint {
                clip_id: *clip_id,
                param: param.clone(),
                time: snap(*time),
                value: *value,
                easing: *easing,
            })
        }
        Action::Automation(AutomationAction::MovePoint { clip_id, param, point_id, time, value }) => {
            Action::Automation(AutomationAction::MovePoint {
                clip_id: *clip_id,
                param: param.clone(),
                point_id: *point_id,
                time: snap(*time),
                value: *value,
            })
        }
        _ => return None,
    };
    (snapped != *action).then_some(snapped)
}
