//! Virtual layout for the arrangement's track list.
//!
//! Row geometry is computed once per structural change ([`VirtualLayout::rebuild`]);
//! scrolling only queries it. Offsets are monotonic, so the viewport lookups
//! are binary searches.

use beltane_types::{ArrangementTrack, TrackId};

/// Pixel metrics, read from `[layout]` in config.toml.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub default_track_height: f64,
    /// Height of an expanded track, including its automation sub-rows
    pub expanded_track_height: f64,
    pub section_header_height: f64,
    /// Extra tracks kept on each side of the viewport
    pub overscan: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_track_height: 48.0,
            expanded_track_height: 160.0,
            section_header_height: 24.0,
            overscan: 3,
        }
    }
}

/// An automation sub-row inside an expanded track.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneRow {
    pub param_index: usize,
    pub offset: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    pub track_id: TrackId,
    /// Top of the track row, below its section header if it has one
    pub offset: f64,
    /// 0 for hidden tracks
    pub height: f64,
    /// Top of the section header drawn directly above this track
    pub header_offset: Option<f64>,
    pub lanes: Vec<LaneRow>,
}

impl TrackLayout {
    pub fn bottom(&self) -> f64 {
        self.offset + self.height
    }

    /// Top of everything drawn for this track, header included.
    pub fn top(&self) -> f64 {
        self.header_offset.unwrap_or(self.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionHeader {
    /// `None` marks the start of uncategorized tracks after a categorized run
    pub category: Option<String>,
    pub offset: f64,
    /// Index of the first track in the section
    pub track_index: usize,
}

/// Half-open range of track indices to render, overscan included.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
    /// Pixel position of the first rendered track (its header, if any)
    pub start_offset: f64,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VirtualLayout {
    config: LayoutConfig,
    tracks: Vec<TrackLayout>,
    headers: Vec<SectionHeader>,
    total_height: f64,
}

impl VirtualLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn build(config: LayoutConfig, tracks: &[ArrangementTrack]) -> Self {
        let mut layout = Self::new(config);
        layout.rebuild(tracks);
        layout
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Recompute every row from the track list.
    pub fn rebuild(&mut self, tracks: &[ArrangementTrack]) {
        let cfg = self.config;
        self.tracks.clear();
        self.headers.clear();

        let mut y = 0.0;
        let mut prev_category: Option<&str> = None;

        for (index, track) in tracks.iter().enumerate() {
            if !track.visible {
                self.tracks.push(TrackLayout {
                    track_id: track.id,
                    offset: y,
                    height: 0.0,
                    header_offset: None,
                    lanes: Vec::new(),
                });
                continue;
            }

            let category = track.category.as_deref();
            let header_offset = if category != prev_category {
                self.headers.push(SectionHeader {
                    category: track.category.clone(),
                    offset: y,
                    track_index: index,
                });
                let top = y;
                y += cfg.section_header_height;
                Some(top)
            } else {
                None
            };
            prev_category = category;

            let (height, lanes) = if track.expanded {
                (cfg.expanded_track_height, lane_rows(track, y, &cfg))
            } else {
                (cfg.default_track_height, Vec::new())
            };

            self.tracks.push(TrackLayout {
                track_id: track.id,
                offset: y,
                height,
                header_offset,
                lanes,
            });
            y += height;
        }

        self.total_height = y;
    }

    pub fn tracks(&self) -> &[TrackLayout] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&TrackLayout> {
        self.tracks.get(index)
    }

    pub fn track_by_id(&self, id: TrackId) -> Option<&TrackLayout> {
        self.tracks.iter().find(|t| t.track_id == id)
    }

    pub fn headers(&self) -> &[SectionHeader] {
        &self.headers
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    /// Tracks intersecting `[scroll_top, scroll_top + viewport_height]`,
    /// widened by the overscan count on each side.
    pub fn visible_range(&self, scroll_top: f64, viewport_height: f64) -> VisibleRange {
        let n = self.tracks.len();
        if n == 0 {
            return VisibleRange::default();
        }
        let top = scroll_top.max(0.0);
        let bottom = top + viewport_height.max(0.0);

        let first = self.tracks.partition_point(|t| t.bottom() <= top);
        let past_last = self.tracks.partition_point(|t| t.top() <= bottom);

        let start = first.saturating_sub(self.config.overscan).min(n - 1);
        let end = (past_last + self.config.overscan).min(n).max(start);

        VisibleRange {
            start,
            end,
            start_offset: self.tracks[start].top(),
        }
    }

    /// The section header pinned to the top of the viewport: the last one
    /// at or above `scroll_top`.
    pub fn sticky_header(&self, scroll_top: f64) -> Option<&SectionHeader> {
        let i = self.headers.partition_point(|h| h.offset <= scroll_top);
        i.checked_sub(1).map(|i| &self.headers[i])
    }

    /// Index of the track row under `y`. Headers and empty space map to `None`.
    pub fn track_at(&self, y: f64) -> Option<usize> {
        let i = self.tracks.partition_point(|t| t.bottom() <= y);
        let track = self.tracks.get(i)?;
        (y >= track.offset && track.height > 0.0).then_some(i)
    }
}

/// Split the space below an expanded track's main row evenly between its
/// open automation lanes.
fn lane_rows(track: &ArrangementTrack, track_offset: f64, cfg: &LayoutConfig) -> Vec<LaneRow> {
    let open: Vec<usize> = track
        .automation_lanes
        .iter()
        .filter(|l| !l.collapsed)
        .map(|l| l.param_index)
        .collect();
    if open.is_empty() {
        return Vec::new();
    }
    let lane_space = (cfg.expanded_track_height - cfg.default_track_height).max(0.0);
    let height = lane_space / open.len() as f64;
    let first = track_offset + cfg.default_track_height;
    open.into_iter()
        .enumerate()
        .map(|(i, param_index)| LaneRow {
            param_index,
            offset: first + i as f64 * height,
            height,
        })
        .collect()
}
