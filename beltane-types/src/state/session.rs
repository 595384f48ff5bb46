//! Session state: everything that is snapshotted for undo and persisted.

use serde::{Deserialize, Serialize};

use super::arrangement::ArrangementState;
use super::selection::SelectionState;
use super::transport::TransportConfig;

/// Current snapshot layout. Bump when a field changes meaning.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Project-level state container.
/// The transport cursor and playback state are runtime-only and live outside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub arrangement: ArrangementState,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub selection: SelectionState,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_transport(transport: TransportConfig) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    /// Snap a time to the current grid.
    pub fn snap_time(&self, t: f64) -> f64 {
        self.transport.snap_time(t)
    }
}

/// On-disk/in-history wrapper around a [`SessionState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "legacy_version")]
    pub format_version: u32,
    #[serde(flatten)]
    pub session: SessionState,
}

fn legacy_version() -> u32 {
    1
}

impl SessionSnapshot {
    pub fn new(session: SessionState) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            session,
        }
    }
}
