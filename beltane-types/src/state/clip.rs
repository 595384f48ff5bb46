//! Clips (reusable note patterns) and their placements on the timeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::automation::{rebuild_lanes, ClipAutomation, ParameterLaneConfig};
use super::note::{NoteEvent, SequencerNote, MIN_NOTE_DURATION};
use crate::{ClipId, InstanceId, NoteId, TrackId};

/// Shortest length a clip can be edited down to (seconds).
pub const MIN_CLIP_DURATION: f64 = MIN_NOTE_DURATION;

/// Reusable pattern of notes for a single generator.
/// Note times are relative to clip start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerClip {
    pub id: ClipId,
    pub name: String,
    /// Loop length in seconds. Notes are not truncated to it.
    pub duration: f64,
    pub color: String,
    pub notes: Vec<SequencerNote>,
    pub synth_name: String,
    #[serde(default)]
    pub param_names: Vec<String>,
    /// Backing source file, if the clip was loaded from one
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Set on every mutation, cleared by the persistence layer
    #[serde(default)]
    pub is_dirty: bool,
    /// One entry per automated parameter
    #[serde(default)]
    pub automation: Vec<ClipAutomation>,
    #[serde(default)]
    pub parameter_lanes: Vec<ParameterLaneConfig>,
}

impl SequencerClip {
    pub fn new(id: ClipId, name: String, synth_name: String, duration: f64, color: String) -> Self {
        Self {
            id,
            name,
            duration: duration.max(MIN_CLIP_DURATION),
            color,
            notes: Vec::new(),
            synth_name,
            param_names: Vec::new(),
            file_path: None,
            is_dirty: true,
            automation: Vec::new(),
            parameter_lanes: Vec::new(),
        }
    }

    pub fn note(&self, id: NoteId) -> Option<&SequencerNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn note_mut(&mut self, id: NoteId) -> Option<&mut SequencerNote> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn selected_notes(&self) -> impl Iterator<Item = &SequencerNote> {
        self.notes.iter().filter(|n| n.selected)
    }

    pub fn automation_for(&self, param_name: &str) -> Option<&ClipAutomation> {
        self.automation.iter().find(|a| a.param_name == param_name)
    }

    pub fn automation_for_mut(&mut self, param_name: &str) -> Option<&mut ClipAutomation> {
        self.automation.iter_mut().find(|a| a.param_name == param_name)
    }

    /// Resync `parameter_lanes` with `param_names`.
    pub fn rebuild_parameter_lanes(&mut self) {
        self.parameter_lanes = rebuild_lanes(&self.parameter_lanes, &self.param_names);
    }

    /// The clip's note stream for playback, ordered by start time.
    pub fn note_events(&self) -> Vec<NoteEvent> {
        let mut events: Vec<NoteEvent> = self
            .notes
            .iter()
            .filter(|n| !n.muted)
            .map(NoteEvent::from)
            .collect();
        events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        events
    }

    /// Sample every automated parameter at `t` (seconds from clip start).
    pub fn automation_values_at(&self, t: f64) -> Vec<(String, f64)> {
        self.automation
            .iter()
            .filter_map(|a| a.value_at(t).map(|v| (a.param_name.clone(), v)))
            .collect()
    }

    pub(crate) fn touch(&mut self) {
        self.is_dirty = true;
    }
}

/// A placement of a clip on a track. Multiple instances can share a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInstance {
    pub id: InstanceId,
    pub clip_id: ClipId,
    /// Stable track reference; resolved to a row index at layout time
    pub track_id: TrackId,
    /// Absolute arrangement time in seconds
    pub start_time: f64,
}

impl ClipInstance {
    pub fn end_time(&self, clip: &SequencerClip) -> f64 {
        self.start_time + clip.duration
    }

    pub fn contains(&self, clip: &SequencerClip, time: f64) -> bool {
        time >= self.start_time && time < self.end_time(clip)
    }
}
