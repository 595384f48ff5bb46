use beltane_types::{duplicate_selection, NoteId, SessionState};

use crate::action::{ClipboardAction, DispatchResult};
use crate::state::AppState;

pub(super) fn dispatch_clipboard(action: &ClipboardAction, state: &mut AppState) -> DispatchResult {
    let AppState {
        session,
        clipboard,
        transport,
        ..
    } = state;
    let SessionState {
        arrangement,
        selection,
        transport: config,
    } = session;

    match action {
        ClipboardAction::Copy => {
            if !clipboard.copy(arrangement, selection) {
                log::debug!(target: "dispatch", "copy: nothing selected");
            }
            DispatchResult::none()
        }
        ClipboardAction::Cut => {
            if clipboard.cut(arrangement, selection) {
                DispatchResult::with_playback()
            } else {
                log::debug!(target: "dispatch", "cut: nothing selected");
                DispatchResult::none()
            }
        }
        ClipboardAction::Paste { at } => {
            let paste_time = config.snap_time(at.unwrap_or_else(|| transport.cursor()));
            pasted(clipboard.paste(arrangement, selection, paste_time))
        }
        ClipboardAction::Duplicate => pasted(duplicate_selection(arrangement, selection)),
    }
}

fn pasted(ids: Vec<NoteId>) -> DispatchResult {
    if ids.is_empty() {
        return DispatchResult::none();
    }
    DispatchResult {
        playback_dirty: true,
        pasted: ids,
        ..DispatchResult::none()
    }
}
