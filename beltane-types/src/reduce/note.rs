use super::Reduced;
use crate::{ArrangementState, CreatedId, NoteAction};

pub(super) fn reduce(action: &NoteAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        NoteAction::Add { clip_id, spec } => {
            Reduced::created_or_stale(arr.add_note(*clip_id, spec.clone()).map(CreatedId::Note))
        }
        NoteAction::Remove { clip_id, note_id } => {
            Reduced::from_bool(arr.remove_note(*clip_id, *note_id))
        }
        NoteAction::Move { clip_id, note_id, start_time } => {
            Reduced::from_bool(arr.move_note(*clip_id, *note_id, *start_time))
        }
        NoteAction::Resize { clip_id, note_id, duration } => {
            Reduced::from_bool(arr.resize_note(*clip_id, *note_id, *duration))
        }
        NoteAction::SetPitch { clip_id, note_id, frequency, amplitude } => {
            Reduced::from_bool(arr.set_note_pitch(*clip_id, *note_id, *frequency, *amplitude))
        }
        NoteAction::SetParam { clip_id, note_id, index, value } => {
            Reduced::from_bool(arr.set_note_param(*clip_id, *note_id, *index, *value))
        }
        NoteAction::SetMuted { clip_id, note_id, muted } => {
            Reduced::from_bool(arr.set_note_muted(*clip_id, *note_id, *muted))
        }
    }
}
