use super::Reduced;
use crate::{TransportAction, TransportConfig};

pub(super) fn reduce(action: &TransportAction, config: &mut TransportConfig) -> Reduced {
    match action {
        TransportAction::SetBpm(bpm) => return Reduced::from_bool(config.set_bpm(*bpm)),
        TransportAction::SetLoop { start, end } => {
            return Reduced::from_bool(config.set_loop(*start, *end))
        }
        TransportAction::ToggleLoop => config.loop_enabled = !config.loop_enabled,
        TransportAction::SetSnapMode(mode) => config.snap_mode = *mode,
        // Cursor and playback state belong to the core transport controller
        TransportAction::Play
        | TransportAction::Pause
        | TransportAction::Stop
        | TransportAction::TogglePlay
        | TransportAction::Seek { .. } => return Reduced::NotReducible,
    }
    Reduced::Changed
}
