//! The seam between a host and the state engine.

use crate::{Action, DispatchResult};

/// Applies actions to an editing session.
///
/// `beltane-core` provides the in-process implementation; hosts may wrap it
/// (e.g. to record or replay gestures).
pub trait Dispatcher {
    fn dispatch(&mut self, action: &Action) -> DispatchResult;

    /// Dispatch a batch in order, merging the results.
    fn dispatch_all(&mut self, actions: &[Action]) -> DispatchResult {
        let mut result = DispatchResult::none();
        for action in actions {
            result.merge(self.dispatch(action));
        }
        result
    }
}
