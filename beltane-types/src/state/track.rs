use serde::{Deserialize, Serialize};

use super::automation::{rebuild_lanes, ParameterLaneConfig};
use crate::TrackId;

/// Colors assigned to new tracks and clips, cycled by count.
pub const TRACK_PALETTE: [&str; 8] = [
    "#e06c75", "#98c379", "#e5c07b", "#61afef", "#c678dd", "#56b6c2", "#d19a66", "#abb2bf",
];

/// Palette color for the `n`th track.
pub fn palette_color(n: usize) -> String {
    TRACK_PALETTE[n % TRACK_PALETTE.len()].to_string()
}

/// A lane on the arrangement timeline, bound to one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementTrack {
    pub id: TrackId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
    pub synth_name: String,
    /// Whether automation sub-rows are shown
    #[serde(default)]
    pub expanded: bool,
    /// Hidden tracks take no vertical space
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Section grouping; a header is drawn where it changes
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub automation_lanes: Vec<ParameterLaneConfig>,
}

fn default_visible() -> bool {
    true
}

impl ArrangementTrack {
    pub fn new(id: TrackId, name: String, synth_name: String, color: String) -> Self {
        Self {
            id,
            name,
            color,
            muted: false,
            solo: false,
            synth_name,
            expanded: false,
            visible: true,
            category: None,
            automation_lanes: Vec::new(),
        }
    }

    /// Resync lane configs with the generator's current parameter names.
    pub fn rebuild_automation_lanes(&mut self, param_names: &[String]) {
        self.automation_lanes = rebuild_lanes(&self.automation_lanes, param_names);
    }

    /// Lanes that render as sub-rows when the track is expanded.
    pub fn open_lane_count(&self) -> usize {
        self.automation_lanes.iter().filter(|l| !l.collapsed).count()
    }
}
