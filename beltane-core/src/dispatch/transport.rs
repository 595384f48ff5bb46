use crate::action::{DispatchResult, TransportAction};
use crate::state::AppState;
use crate::transport::TransportController;

/// Playback control: moves the runtime cursor only, never the session.
pub(super) fn dispatch_playback(action: &TransportAction, state: &mut AppState) -> DispatchResult {
    let duration = state.duration();
    let config = &state.session.transport;
    let controller = &mut state.transport;

    let changed = match action {
        TransportAction::Play => {
            rewind_if_at_end(controller, duration);
            controller.play()
        }
        TransportAction::Pause => controller.pause(),
        TransportAction::Stop => controller.stop(),
        TransportAction::TogglePlay => {
            if !controller.is_playing() {
                rewind_if_at_end(controller, duration);
            }
            controller.toggle_play()
        }
        TransportAction::Seek { time, relative } => {
            let from = controller.cursor();
            controller.seek(*time, *relative, duration, config) != from
        }
        // Settings are reduced into the session
        TransportAction::SetBpm(_)
        | TransportAction::SetLoop { .. }
        | TransportAction::ToggleLoop
        | TransportAction::SetSnapMode(_) => false,
    };

    if !changed {
        log::debug!(
            target: "transport",
            "{:?} has no effect while {:?}",
            action,
            controller.state()
        );
    }
    DispatchResult::none()
}

/// Playing from a cursor parked at the end starts over.
fn rewind_if_at_end(controller: &mut TransportController, duration: f64) {
    if duration > 0.0 && controller.cursor() >= duration {
        controller.stop();
    }
}
