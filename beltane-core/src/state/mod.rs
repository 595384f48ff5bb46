pub mod persistence;
pub mod undo;

pub use persistence::SnapshotError;
pub use undo::{CoalesceKey, HistorySettings, UndoHistory};

use beltane_types::{ClipAction, Clipboard, NoteSpec, SessionState};

use crate::config::Config;
use crate::layout::VirtualLayout;
use crate::transport::{Clock, SystemClock, TransportController};

/// Lengths given to things created without an explicit size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDefaults {
    pub clip_duration: f64,
    pub note_duration: f64,
}

impl Default for EditDefaults {
    fn default() -> Self {
        Self {
            clip_duration: 4.0,
            note_duration: 0.5,
        }
    }
}

impl EditDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clip_duration: config.clip_duration(),
            note_duration: config.note_duration(),
        }
    }

    pub fn note_at(&self, start_time: f64) -> NoteSpec {
        NoteSpec::new(start_time, self.note_duration)
    }

    pub fn create_clip(&self, name: impl Into<String>, synth_name: impl Into<String>) -> ClipAction {
        ClipAction::Create {
            name: name.into(),
            synth_name: synth_name.into(),
            duration: self.clip_duration,
        }
    }
}

/// Everything an editing session owns. Constructed explicitly and handed to
/// [`crate::dispatch::dispatch_action`]; there is no global instance.
#[derive(Debug)]
pub struct AppState {
    /// Snapshotted for undo and persisted
    pub session: SessionState,
    pub clipboard: Clipboard,
    /// Undo/redo history (owned by state so dispatch can manage it)
    pub undo_history: UndoHistory,
    /// Runtime cursor; not part of the session
    pub transport: TransportController,
    /// Track row geometry, rebuilt by dispatch when tracks change
    pub layout: VirtualLayout,
    pub defaults: EditDefaults,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State seeded from the embedded configuration only.
    pub fn new() -> Self {
        Self::new_with_config(&Config::default())
    }

    pub fn new_with_config(config: &Config) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// As [`new_with_config`](Self::new_with_config), with the transport
    /// driven by `clock`.
    pub fn with_clock(config: &Config, clock: Box<dyn Clock>) -> Self {
        Self {
            session: SessionState::new_with_transport(config.transport()),
            clipboard: Clipboard::default(),
            undo_history: UndoHistory::new(config.history()),
            transport: TransportController::new(clock),
            layout: VirtualLayout::new(config.layout()),
            defaults: EditDefaults::from_config(config),
        }
    }

    /// End of the last clip instance, in seconds.
    pub fn duration(&self) -> f64 {
        self.session.arrangement.duration()
    }

    /// Per-frame transport advance. Returns the cursor.
    pub fn tick(&mut self) -> f64 {
        let duration = self.duration();
        self.transport.tick(duration, &self.session.transport)
    }

    pub fn rebuild_layout(&mut self) {
        self.layout.rebuild(&self.session.arrangement.tracks);
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        persistence::to_json(&self.session)
    }

    /// Replace the session with a loaded one. History is cleared and the
    /// transport is stopped.
    pub fn replace_session(&mut self, session: SessionState) {
        self.session = session;
        self.undo_history.clear();
        self.transport.stop();
        self.rebuild_layout();
        log::debug!(
            target: "persistence",
            "session replaced: {} tracks, {} clips",
            self.session.arrangement.tracks.len(),
            self.session.arrangement.clips.len()
        );
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), SnapshotError> {
        let session = persistence::from_json(json)?;
        self.replace_session(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_types::{PlaybackState, SnapMode};

    #[test]
    fn new_state_uses_config_defaults() {
        let state = AppState::new();
        assert_eq!(state.session.transport.bpm, 120.0);
        assert_eq!(state.session.transport.snap_mode, SnapMode::Beat);
        assert_eq!(state.defaults.clip_duration, 4.0);
        assert_eq!(state.layout.config().overscan, 3);
        assert!(!state.undo_history.can_undo());
        assert_eq!(state.transport.state(), PlaybackState::Stopped);
    }

    #[test]
    fn load_json_replaces_session_and_clears_history() {
        let mut source = AppState::new();
        source.session.arrangement.add_track("A".to_string(), "saw".to_string());
        let json = source.to_json().unwrap();

        let mut state = AppState::new();
        state.undo_history.push(&state.session);
        state.transport.play();
        state.load_json(&json).unwrap();

        assert_eq!(state.session, source.session);
        assert!(!state.undo_history.can_undo());
        assert_eq!(state.transport.state(), PlaybackState::Stopped);
        assert_eq!(state.layout.tracks().len(), 1);
    }

    #[test]
    fn load_bad_json_leaves_state_alone() {
        let mut state = AppState::new();
        state.session.arrangement.add_track("A".to_string(), "saw".to_string());
        let before = state.session.clone();
        assert!(state.load_json("{ nope").is_err());
        assert_eq!(state.session, before);
    }

    #[test]
    fn edit_defaults_size_new_things() {
        let defaults = EditDefaults::default();
        assert_eq!(defaults.note_at(1.0).duration, 0.5);
        assert!(matches!(
            defaults.create_clip("A", "saw"),
            ClipAction::Create { duration, .. } if duration == 4.0
        ));
    }
}
