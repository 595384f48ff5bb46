//! # beltane-core
//!
//! Editing engine for the Beltane sequencer. Provides dispatch, undo history,
//! persistence, the transport controller and the virtual track layout on top
//! of the `beltane-types` data model, independent of any UI framework.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beltane_core::config::Config;
//! use beltane_core::dispatch::dispatch_action;
//! use beltane_core::state::AppState;
//! use beltane_core::action::{Action, TransportAction};
//!
//! // 1. Create state with defaults from config
//! let config = Config::load();
//! let mut state = AppState::new_with_config(&config);
//!
//! // 2. Dispatch actions to mutate state (undo snapshots are pushed automatically)
//! let result = dispatch_action(&Action::Transport(TransportAction::Play), &mut state);
//!
//! // 3. React to the result: rebuild views on layout_dirty, resync playback
//! //    on playback_dirty
//!
//! // 4. Once per frame, advance the cursor and query the viewport
//! let cursor = state.tick();
//! let rows = state.layout.visible_range(scroll_top, viewport_height);
//! ```
//!
//! ## Module Overview
//!
//! - [`state`]: `AppState`, undo history, JSON snapshot persistence
//! - [`action`]: Action enums and `DispatchResult`, re-exported from beltane-types
//! - [`dispatch`]: `dispatch_action()`, the single entry point for state mutation
//! - [`transport`]: play/pause/stop state machine and cursor, driven by a `Clock`
//! - [`layout`]: track row offsets, visible range and sticky section headers
//! - [`config`]: TOML configuration loading (embedded + user override)

pub mod action;
pub mod config;
pub mod dispatch;
pub mod layout;
pub mod state;
pub mod transport;

pub use beltane_types as types;
