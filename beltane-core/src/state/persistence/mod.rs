//! JSON snapshots of the session.
//!
//! `to_json`/`from_json` are the whole-state snapshot pair used by both the
//! undo history and project files. Loading repairs structural damage
//! (dangling instances, out-of-range times) instead of rejecting the file.


use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use beltane_types::{SessionSnapshot, SessionState, SNAPSHOT_FORMAT_VERSION};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot format version {found} is newer than supported ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("snapshot i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Borrowed twin of `SessionSnapshot`, so serializing does not clone the session.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    #[serde(flatten)]
    session: &'a SessionState,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default = "legacy_version")]
    format_version: u32,
}

fn legacy_version() -> u32 {
    1
}

/// Serialize the session to a compact JSON snapshot.
pub fn to_json(session: &SessionState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&SnapshotRef {
        format_version: SNAPSHOT_FORMAT_VERSION,
        session,
    })?)
}

/// Serialize the session for a project file.
pub fn to_json_pretty(session: &SessionState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(&SnapshotRef {
        format_version: SNAPSHOT_FORMAT_VERSION,
        session,
    })?)
}

/// Parse a snapshot and restore the store's invariants.
///
/// Instances whose clip or track is missing are dropped, id counters are
/// brought past every id in use, and the selection forgets ids that no
/// longer resolve.
pub fn from_json(json: &str) -> Result<SessionState, SnapshotError> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    if probe.format_version > SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: probe.format_version,
            supported: SNAPSHOT_FORMAT_VERSION,
        });
    }

    let SessionSnapshot { mut session, .. } = serde_json::from_str(json)?;

    for orphan in session.arrangement.repair() {
        log::warn!(
            target: "persistence",
            "dropping instance {}: clip {} or track {} does not exist",
            orphan.id,
            orphan.clip_id,
            orphan.track_id
        );
    }
    session.selection.prune(&session.arrangement);
    session.transport.sanitize();

    Ok(session)
}

/// Write a project file. The previous file stays intact until the new one
/// is fully written.
pub fn save_session(path: &Path, session: &SessionState) -> Result<(), SnapshotError> {
    let json = to_json_pretty(session)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    log::debug!(target: "persistence", "saved session to {}", path.display());
    Ok(())
}

pub fn load_session(path: &Path) -> Result<SessionState, SnapshotError> {
    let json = std::fs::read_to_string(path)?;
    let session = from_json(&json)?;
    log::debug!(
        target: "persistence",
        "loaded {} tracks, {} clips from {}",
        session.arrangement.tracks.len(),
        session.arrangement.clips.len(),
        path.display()
    );
    Ok(session)
}
