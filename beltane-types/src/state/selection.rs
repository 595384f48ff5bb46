//! Which clip is being edited, and which notes/instances are selected.
//!
//! Note selection is stored on the notes themselves (`SequencerNote::selected`)
//! and only ever set inside the active clip. Instance selection is a set of ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::arrangement::ArrangementState;
use super::note::SequencerNote;
use crate::{ClipId, InstanceId, NoteId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Clip whose notes are being edited
    pub active_clip: Option<ClipId>,
    #[serde(default)]
    pub selected_instances: BTreeSet<InstanceId>,
}

impl SelectionState {
    /// Switch the active clip. Notes selected in the previous clip are
    /// deselected. A missing clip id is ignored.
    pub fn set_active_clip(&mut self, arr: &mut ArrangementState, clip_id: Option<ClipId>) -> bool {
        if let Some(id) = clip_id {
            if arr.clip(id).is_none() {
                return false;
            }
        }
        if self.active_clip != clip_id {
            if let Some(prev) = self.active_clip {
                arr.set_all_selected(prev, false);
            }
            self.active_clip = clip_id;
        }
        true
    }

    /// Select a note in the active clip. Without `additive`, everything
    /// else in the clip is deselected first.
    pub fn select_note(&self, arr: &mut ArrangementState, note_id: NoteId, additive: bool) -> bool {
        let Some(clip_id) = self.active_clip else {
            return false;
        };
        if arr.note(clip_id, note_id).is_none() {
            return false;
        }
        if !additive {
            arr.set_all_selected(clip_id, false);
        }
        arr.set_note_selected(clip_id, note_id, true)
    }

    pub fn deselect_note(&self, arr: &mut ArrangementState, note_id: NoteId) -> bool {
        self.active_clip
            .is_some_and(|clip_id| arr.set_note_selected(clip_id, note_id, false))
    }

    pub fn toggle_note(&self, arr: &mut ArrangementState, note_id: NoteId) -> bool {
        let Some(clip_id) = self.active_clip else {
            return false;
        };
        match arr.note(clip_id, note_id).map(|n| n.selected) {
            Some(selected) => arr.set_note_selected(clip_id, note_id, !selected),
            None => false,
        }
    }

    pub fn select_all_notes(&self, arr: &mut ArrangementState) -> bool {
        self.active_clip
            .is_some_and(|clip_id| arr.set_all_selected(clip_id, true))
    }

    /// Select the notes of the active clip that start inside `[start, end)`.
    pub fn select_notes_in_range(&self, arr: &mut ArrangementState, start: f64, end: f64, additive: bool) -> usize {
        let Some(clip_id) = self.active_clip else {
            return 0;
        };
        let Some(clip) = arr.clip_mut(clip_id) else {
            return 0;
        };
        let mut count = 0;
        for note in &mut clip.notes {
            let inside = note.start_time >= start && note.start_time < end;
            if inside {
                note.selected = true;
                count += 1;
            } else if !additive {
                note.selected = false;
            }
        }
        count
    }

    /// Deselect every note in the active clip and every instance.
    pub fn clear(&mut self, arr: &mut ArrangementState) {
        if let Some(clip_id) = self.active_clip {
            arr.set_all_selected(clip_id, false);
        }
        self.selected_instances.clear();
    }

    pub fn selected_notes<'a>(&self, arr: &'a ArrangementState) -> Vec<&'a SequencerNote> {
        self.active_clip
            .and_then(|id| arr.clip(id))
            .map(|clip| clip.selected_notes().collect())
            .unwrap_or_default()
    }

    pub fn selected_note_ids(&self, arr: &ArrangementState) -> Vec<NoteId> {
        self.selected_notes(arr).iter().map(|n| n.id).collect()
    }

    /// Remove the selected notes of the active clip.
    pub fn delete_selected_notes(&self, arr: &mut ArrangementState) -> Vec<SequencerNote> {
        match self.active_clip {
            Some(clip_id) => arr.delete_selected_notes(clip_id),
            None => Vec::new(),
        }
    }

    // ---- Instances ----

    pub fn select_instance(&mut self, arr: &ArrangementState, id: InstanceId, additive: bool) -> bool {
        if arr.instance(id).is_none() {
            return false;
        }
        if !additive {
            self.selected_instances.clear();
        }
        self.selected_instances.insert(id);
        true
    }

    pub fn toggle_instance(&mut self, arr: &ArrangementState, id: InstanceId) -> bool {
        if self.selected_instances.remove(&id) {
            return true;
        }
        self.select_instance(arr, id, true)
    }

    pub fn delete_selected_instances(&mut self, arr: &mut ArrangementState) -> usize {
        let removed = arr.delete_instances(&self.selected_instances);
        self.selected_instances.clear();
        removed
    }

    /// Drop references that no longer resolve, e.g. after undo or load.
    pub fn prune(&mut self, arr: &ArrangementState) {
        if self.active_clip.is_some_and(|id| arr.clip(id).is_none()) {
            self.active_clip = None;
        }
        self.selected_instances.retain(|id| arr.instance(*id).is_some());
    }
}
