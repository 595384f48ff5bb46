//! Clipboard types and copy/cut/paste/duplicate for notes.

use serde::{Deserialize, Serialize};

use super::arrangement::ArrangementState;
use super::note::NoteSpec;
use super::selection::SelectionState;
use crate::{ClipId, NoteId};

/// Clipboard contents, independent of the store they were copied from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipboardContents {
    /// Notes with their original clip-relative times
    Notes {
        source_clip: ClipId,
        notes: Vec<NoteSpec>,
    },
}

/// App-wide clipboard (lives in AppState)
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    pub contents: Option<ClipboardContents>,
}

/// Earliest start and latest end of a set of notes.
fn span(notes: &[NoteSpec]) -> Option<(f64, f64)> {
    let min_start = notes.iter().map(|n| n.start_time).reduce(f64::min)?;
    let max_end = notes
        .iter()
        .map(|n| n.start_time + n.duration)
        .reduce(f64::max)?;
    Some((min_start, max_end))
}

/// Add `notes` shifted by `offset` to `clip_id` as the new selection.
fn place_selected(arr: &mut ArrangementState, clip_id: ClipId, notes: &[NoteSpec], offset: f64) -> Vec<NoteId> {
    arr.set_all_selected(clip_id, false);
    let shifted = notes
        .iter()
        .map(|n| NoteSpec {
            start_time: n.start_time + offset,
            ..n.clone()
        })
        .collect();
    let ids = arr.add_notes(clip_id, shifted);
    for id in &ids {
        arr.set_note_selected(clip_id, *id, true);
    }
    ids
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.contents.is_none()
    }

    /// Snapshot the selected notes of the active clip. An empty selection
    /// leaves the clipboard untouched.
    pub fn copy(&mut self, arr: &ArrangementState, sel: &SelectionState) -> bool {
        let Some(source_clip) = sel.active_clip else {
            return false;
        };
        let notes: Vec<NoteSpec> = sel
            .selected_notes(arr)
            .into_iter()
            .map(NoteSpec::from)
            .collect();
        if notes.is_empty() {
            return false;
        }
        self.contents = Some(ClipboardContents::Notes { source_clip, notes });
        true
    }

    /// Copy, then delete the selection.
    pub fn cut(&mut self, arr: &mut ArrangementState, sel: &SelectionState) -> bool {
        if !self.copy(arr, sel) {
            return false;
        }
        sel.delete_selected_notes(arr);
        true
    }

    /// Paste into the active clip so the earliest clipboard note lands at
    /// `paste_time`. Pasted notes become the selection.
    pub fn paste(&self, arr: &mut ArrangementState, sel: &SelectionState, paste_time: f64) -> Vec<NoteId> {
        if !paste_time.is_finite() {
            return Vec::new();
        }
        let Some(ClipboardContents::Notes { notes, .. }) = &self.contents else {
            return Vec::new();
        };
        let Some(clip_id) = sel.active_clip.filter(|id| arr.clip(*id).is_some()) else {
            return Vec::new();
        };
        let Some((min_start, _)) = span(notes) else {
            return Vec::new();
        };
        place_selected(arr, clip_id, notes, paste_time - min_start)
    }
}

/// Copy the selection of the active clip to sit immediately after itself,
/// offset by `max_end - min_start`. The copies become the selection.
pub fn duplicate_selection(arr: &mut ArrangementState, sel: &SelectionState) -> Vec<NoteId> {
    let Some(clip_id) = sel.active_clip else {
        return Vec::new();
    };
    let notes: Vec<NoteSpec> = sel
        .selected_notes(arr)
        .into_iter()
        .map(NoteSpec::from)
        .collect();
    let Some((min_start, max_end)) = span(&notes) else {
        return Vec::new();
    };
    place_selected(arr, clip_id, &notes, max_end - min_start)
}
