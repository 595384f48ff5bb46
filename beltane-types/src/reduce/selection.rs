use super::Reduced;
use crate::{SelectionAction, SessionState};

pub(super) fn reduce(action: &SelectionAction, session: &mut SessionState) -> Reduced {
    let SessionState { arrangement: arr, selection: sel, .. } = session;
    match action {
        SelectionAction::SetActiveClip(clip_id) => Reduced::from_bool(sel.set_active_clip(arr, *clip_id)),
        SelectionAction::SelectNote { note_id, additive } => {
            Reduced::from_bool(sel.select_note(arr, *note_id, *additive))
        }
        SelectionAction::DeselectNote(note_id) => Reduced::from_bool(sel.deselect_note(arr, *note_id)),
        SelectionAction::ToggleNote(note_id) => Reduced::from_bool(sel.toggle_note(arr, *note_id)),
        SelectionAction::SelectAllNotes => Reduced::from_bool(sel.select_all_notes(arr)),
        SelectionAction::SelectRange { start, end, additive } => {
            sel.select_notes_in_range(arr, *start, *end, *additive);
            Reduced::Changed
        }
        SelectionAction::SelectInstance { instance_id, additive } => {
            Reduced::from_bool(sel.select_instance(arr, *instance_id, *additive))
        }
        SelectionAction::ToggleInstance(instance_id) => {
            Reduced::from_bool(sel.toggle_instance(arr, *instance_id))
        }
        SelectionAction::Clear => {
            sel.clear(arr);
            Reduced::Changed
        }
        SelectionAction::DeleteSelectedNotes => {
            sel.delete_selected_notes(arr);
            Reduced::Changed
        }
        SelectionAction::DeleteSelectedInstances => {
            sel.delete_selected_instances(arr);
            Reduced::Changed
        }
    }
}
