//! Every user-facing edit, expressed as data.
//!
//! Actions are dispatched through `beltane-core`, which pushes undo snapshots
//! for undoable ones and hands state mutations to [`crate::reduce`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::keyframe::KeyframeValue;
use crate::state::{NoteSpec, SnapMode};
use crate::{ClipId, InstanceId, NoteId, PointId, TrackId};

// ============================================================================
// DispatchResult
// ============================================================================

/// An id allocated by an action, so the caller can follow up on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CreatedId {
    Track(TrackId),
    Clip(ClipId),
    Instance(InstanceId),
    Note(NoteId),
    Point(PointId),
    /// Index of a keyframe on an environment curve
    Keyframe(usize),
}

/// Result of dispatching an action: dirty flags for the host to act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResult {
    /// Track rows changed; the virtual layout must be rebuilt
    pub layout_dirty: bool,
    /// Notes, automation or transport settings changed; playback must resync
    pub playback_dirty: bool,
    pub created: Option<CreatedId>,
    /// Notes created by paste or duplicate
    pub pasted: Vec<NoteId>,
    /// True when the action named something that no longer exists, or was
    /// refused for a NaN or infinite number
    pub stale: bool,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn stale() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    pub fn with_layout() -> Self {
        Self {
            layout_dirty: true,
            ..Self::default()
        }
    }

    pub fn with_playback() -> Self {
        Self {
            playback_dirty: true,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: DispatchResult) {
        self.layout_dirty |= other.layout_dirty;
        self.playback_dirty |= other.playback_dirty;
        if other.created.is_some() {
            self.created = other.created;
        }
        self.pasted.extend(other.pasted);
        self.stale |= other.stale;
    }
}

// ============================================================================
// Domain-specific action enums
// ============================================================================

/// Track list actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackAction {
    Add { name: String, synth_name: String },
    /// Create empty tracks up to this row if needed
    Ensure(usize),
    /// Find or create the track for a generator
    EnsureSynth(String),
    Remove(TrackId),
    Move(TrackId, usize),
    Rename(TrackId, String),
    SetColor(TrackId, String),
    SetMuted(TrackId, bool),
    SetSolo(TrackId, bool),
    SetExpanded(TrackId, bool),
    SetVisible(TrackId, bool),
    SetCategory(TrackId, Option<String>),
    /// Resync automation lane configs with the generator's parameters
    RebuildLanes(TrackId, Vec<String>),
    SetLaneCollapsed(TrackId, usize, bool),   // track, param_index, collapsed
    SetLaneRange(TrackId, usize, f64, f64),   // track, param_index, min, max
}

/// Clip actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipAction {
    Create { name: String, synth_name: String, duration: f64 },
    Delete(ClipId),
    Rename(ClipId, String),
    SetDuration(ClipId, f64),
    SetParamNames(ClipId, Vec<String>),
    SetFilePath(ClipId, Option<PathBuf>),
    SetLaneCollapsed(ClipId, usize, bool),
    SetLaneRange(ClipId, usize, f64, f64),
    /// Persistence wrote the clip's backing file
    MarkClean(ClipId),
}

/// Clip placement actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstanceAction {
    Place { clip_id: ClipId, track_id: TrackId, start_time: f64 },
    Remove(InstanceId),
    Move { instance_id: InstanceId, track_id: Option<TrackId>, start_time: f64 },
}

/// Note editing actions. All carry the clip they target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoteAction {
    Add { clip_id: ClipId, spec: NoteSpec },
    Remove { clip_id: ClipId, note_id: NoteId },
    Move { clip_id: ClipId, note_id: NoteId, start_time: f64 },
    Resize { clip_id: ClipId, note_id: NoteId, duration: f64 },
    SetPitch { clip_id: ClipId, note_id: NoteId, frequency: f64, amplitude: f64 },
    SetParam { clip_id: ClipId, note_id: NoteId, index: usize, value: f64 },
    SetMuted { clip_id: ClipId, note_id: NoteId, muted: bool },
}

/// Clip automation actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutomationAction {
    AddPoint { clip_id: ClipId, param: String, time: f64, value: f64, easing: Easing },
    RemovePoint { clip_id: ClipId, param: String, point_id: PointId },
    MovePoint { clip_id: ClipId, param: String, point_id: PointId, time: f64, value: f64 },
    SetEasing { clip_id: ClipId, param: String, point_id: PointId, easing: Easing },
    Clear { clip_id: ClipId, param: String },
}

/// Environment curve actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnvironmentAction {
    SetKey { curve: String, time: f64, value: KeyframeValue, easing: Easing },
    RemoveKey { curve: String, index: usize },
    RemoveKeyAt { curve: String, time: f64 },
    MoveKey { curve: String, index: usize, time: f64 },
    SetEasing { curve: String, index: usize, easing: Easing },
    RemoveCurve(String),
}

/// Selection actions. Note selection applies to the active clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionAction {
    SetActiveClip(Option<ClipId>),
    SelectNote { note_id: NoteId, additive: bool },
    DeselectNote(NoteId),
    ToggleNote(NoteId),
    SelectAllNotes,
    SelectRange { start: f64, end: f64, additive: bool },
    SelectInstance { instance_id: InstanceId, additive: bool },
    ToggleInstance(InstanceId),
    Clear,
    DeleteSelectedNotes,
    DeleteSelectedInstances,
}

/// Clipboard actions. Handled by core dispatch, which owns the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipboardAction {
    Copy,
    Cut,
    /// Paste at a time; `None` pastes at the transport cursor
    Paste { at: Option<f64> },
    Duplicate,
}

/// Transport actions. Settings changes are reduced into the session;
/// playback control is handled by the core transport controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportAction {
    Play,
    Pause,
    Stop,
    TogglePlay,
    Seek { time: f64, relative: bool },
    SetBpm(f64),
    SetLoop { start: f64, end: f64 },
    ToggleLoop,
    SetSnapMode(SnapMode),
}

impl TransportAction {
    /// Playback control only touches the runtime cursor, not the session.
    pub fn is_playback_control(&self) -> bool {
        matches!(
            self,
            TransportAction::Play
                | TransportAction::Pause
                | TransportAction::Stop
                | TransportAction::TogglePlay
                | TransportAction::Seek { .. }
        )
    }
}

/// Actions that mutate session state. Handled by `dispatch_action()` in
/// beltane-core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Track(TrackAction),
    Clip(ClipAction),
    Instance(InstanceAction),
    Note(NoteAction),
    Automation(AutomationAction),
    Environment(EnvironmentAction),
    Selection(SelectionAction),
    Clipboard(ClipboardAction),
    Transport(TransportAction),
    /// Undo the last undoable state change
    Undo,
    /// Redo the last undone state change
    Redo,
}

impl Action {
    /// Whether the action changes the track rows the layout is built from.
    pub fn affects_layout(&self) -> bool {
        match self {
            Action::Track(_) | Action::Undo | Action::Redo => true,
            _ => false,
        }
    }

    /// Whether the action changes what the playback runtime consumes.
    pub fn affects_playback(&self) -> bool {
        match self {
            Action::Track(a) => matches!(
                a,
                TrackAction::Remove(_) | TrackAction::SetMuted(..) | TrackAction::SetSolo(..)
            ),
            Action::Clip(a) => !matches!(
                a,
                ClipAction::Rename(..)
                    | ClipAction::SetFilePath(..)
                    | ClipAction::SetLaneCollapsed(..)
                    | ClipAction::SetLaneRange(..)
                    | ClipAction::MarkClean(_)
            ),
            Action::Instance(_)
            | Action::Note(_)
            | Action::Automation(_)
            | Action::Environment(_)
            | Action::Undo
            | Action::Redo => true,
            Action::Selection(a) => matches!(
                a,
                SelectionAction::DeleteSelectedNotes | SelectionAction::DeleteSelectedInstances
            ),
            Action::Clipboard(a) => !matches!(a, ClipboardAction::Copy),
            Action::Transport(a) => !a.is_playback_control(),
        }
    }
}
