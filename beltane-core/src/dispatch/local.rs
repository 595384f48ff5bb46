//! LocalDispatcher: Dispatcher implementation for in-process execution.

use beltane_types::{Action, DispatchResult, Dispatcher};

use crate::state::AppState;

use super::dispatch_action;

/// Dispatcher that applies actions directly to an [`AppState`].
pub struct LocalDispatcher<'a> {
    pub state: &'a mut AppState,
}

impl<'a> LocalDispatcher<'a> {
    pub fn new(state: &'a mut AppState) -> Self {
        Self { state }
    }
}

impl Dispatcher for LocalDispatcher<'_> {
    fn dispatch(&mut self, action: &Action) -> DispatchResult {
        dispatch_action(action, self.state)
    }
}
