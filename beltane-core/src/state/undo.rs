use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::persistence::{from_json, to_json};
use beltane_types::{
    Action, ClipAction, ClipboardAction, InstanceAction, InstanceId, NoteAction, NoteId,
    AutomationAction, PointId, SelectionAction, SessionState, TransportAction,
};

/// Bounds for the undo history, read from `[history]` in config.toml.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySettings {
    pub max_depth: usize,
    /// Continuous edits with the same key inside this window share a snapshot
    pub coalesce_window: Duration,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: 100,
            coalesce_window: Duration::from_millis(500),
        }
    }
}

/// Identifies a gesture for undo coalescing. Sequential actions with the same
/// key within the coalesce window share a single undo snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalesceKey {
    /// Dragging, resizing or re-pitching one note
    Note(NoteId),
    /// Dragging one automation point
    Point(PointId),
    /// Dragging one clip instance along the timeline
    Instance(InstanceId),
    /// Scrubbing the tempo
    Tempo,
    /// Dragging a loop boundary
    LoopRange,
    /// No coalescing; structural changes always get their own snapshot.
    None,
}

/// Whole-session snapshot history. Each entry is the JSON produced by
/// [`to_json`], taken before the edit it undoes.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: VecDeque<String>,
    redo_stack: VecDeque<String>,
    max_depth: usize,
    coalesce_window: Duration,
    last_coalesce_key: CoalesceKey,
    last_push_time: Instant,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(HistorySettings::default())
    }
}

impl UndoHistory {
    pub fn new(settings: HistorySettings) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: settings.max_depth.max(1),
            coalesce_window: settings.coalesce_window,
            last_coalesce_key: CoalesceKey::None,
            last_push_time: Instant::now(),
        }
    }

    /// Push a snapshot of `session` before mutating it. Clears the redo stack.
    pub fn push(&mut self, session: &SessionState) {
        let snapshot = match to_json(session) {
            Ok(json) => json,
            Err(e) => {
                log::error!(target: "undo", "could not snapshot session: {}", e);
                return;
            }
        };
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
    }

    /// Push with coalescing support. If `key` matches the previous push's key
    /// and less than the coalesce window has elapsed, the push is skipped,
    /// keeping the pre-gesture snapshot already on the stack.
    pub fn push_coalesced(&mut self, session: &SessionState, key: CoalesceKey) {
        self.push_coalesced_at(session, key, Instant::now());
    }

    /// [`push_coalesced`](Self::push_coalesced) with an explicit timestamp.
    pub fn push_coalesced_at(&mut self, session: &SessionState, key: CoalesceKey, now: Instant) {
        if key != CoalesceKey::None
            && key == self.last_coalesce_key
            && now.saturating_duration_since(self.last_push_time) < self.coalesce_window
        {
            // Same gesture, within window, extend it
            self.last_push_time = now;
            return;
        }
        self.push(session);
        self.last_coalesce_key = key;
        self.last_push_time = now;
    }

    fn clear_coalesce(&mut self) {
        self.last_coalesce_key = CoalesceKey::None;
    }

    /// Undo: pop from the undo stack, snapshot the current state onto the
    /// redo stack, and restore the popped snapshot.
    pub fn undo(&mut self, session: &mut SessionState) -> bool {
        self.clear_coalesce();
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        match swap_in(entry, session) {
            Some(inverse) => {
                self.redo_stack.push_back(inverse);
                true
            }
            None => false,
        }
    }

    /// Redo: the mirror image of [`undo`](Self::undo).
    pub fn redo(&mut self, session: &mut SessionState) -> bool {
        self.clear_coalesce();
        let Some(entry) = self.redo_stack.pop_back() else {
            return false;
        };
        match swap_in(entry, session) {
            Some(inverse) => {
                self.undo_stack.push_back(inverse);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clear_coalesce();
    }
}

/// Replace `session` with the snapshot in `entry`, returning a snapshot of
/// what was replaced. A snapshot that fails to decode is discarded and the
/// session is left untouched.
fn swap_in(entry: String, session: &mut SessionState) -> Option<String> {
    let restored = match from_json(&entry) {
        Ok(s) => s,
        Err(e) => {
            log::error!(target: "undo", "discarding unreadable history entry: {}", e);
            return None;
        }
    };
    let inverse = match to_json(session) {
        Ok(json) => json,
        Err(e) => {
            log::error!(target: "undo", "could not snapshot session: {}", e);
            return None;
        }
    };
    *session = restored;
    Some(inverse)
}

/// Map an action to a coalesce key. Actions with the same key that arrive
/// within the coalesce window share a single undo snapshot.
pub fn coalesce_key(action: &Action) -> CoalesceKey {
    match action {
        Action::Note(a) => match a {
            NoteAction::Move { note_id, .. }
            | NoteAction::Resize { note_id, .. }
            | NoteAction::SetPitch { note_id, .. }
            | NoteAction::SetParam { note_id, .. } => CoalesceKey::Note(*note_id),
            _ => CoalesceKey::None,
        },
        Action::Automation(AutomationAction::MovePoint { point_id, .. }) => {
            CoalesceKey::Point(*point_id)
        }
        Action::Instance(InstanceAction::Move { instance_id, .. }) => {
            CoalesceKey::Instance(*instance_id)
        }
        Action::Transport(TransportAction::SetBpm(_)) => CoalesceKey::Tempo,
        Action::Transport(TransportAction::SetLoop { .. }) => CoalesceKey::LoopRange,
        _ => CoalesceKey::None,
    }
}

pub fn is_undoable(action: &Action) -> bool {
    match action {
        Action::Track(_)
        | Action::Instance(_)
        | Action::Note(_)
        | Action::Automation(_)
        | Action::Environment(_) => true,
        // Bookkeeping for the persistence layer, not an edit
        Action::Clip(ClipAction::MarkClean(_)) => false,
        Action::Clip(_) => true,
        Action::Selection(a) => matches!(
            a,
            SelectionAction::DeleteSelectedNotes | SelectionAction::DeleteSelectedInstances
        ),
        Action::Clipboard(a) => !matches!(a, ClipboardAction::Copy),
        Action::Transport(a) => !a.is_playback_control(),
        Action::Undo | Action::Redo => false,
    }
}
