//! # beltane-types
//!
//! Data model and pure math for the Beltane sequencer: notes, clips, clip
//! instances, tracks, per-parameter automation, the easing engine and
//! keyframe curves.
//!
//! Nothing in this crate performs I/O, logging or undo bookkeeping. Mutations
//! are plain methods on the state types, and the [`reduce`] module maps
//! [`Action`]s onto them. `beltane-core` layers dispatch, history, transport
//! and layout on top.

pub mod action;
pub mod dispatch;
pub mod easing;
pub mod keyframe;
pub mod reduce;
pub mod state;

pub use action::*;
pub use dispatch::Dispatcher;
pub use easing::{CubicBezier, Easing};
pub use keyframe::{Interpolate, Keyframe, KeyframeTrack, KeyframeValue, TIME_EPSILON};

// Re-export all state types at crate root for convenience
pub use state::*;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for an arrangement track. Stable across reorder.
    TrackId
);
id_type!(
    /// Unique identifier for a clip.
    ClipId
);
id_type!(
    /// Unique identifier for a placement of a clip on the timeline.
    InstanceId
);
id_type!(
    /// Unique identifier for a note. Unique across all clips.
    NoteId
);
id_type!(
    /// Unique identifier for an automation point.
    PointId
);
