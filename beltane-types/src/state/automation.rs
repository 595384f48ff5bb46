//! Per-parameter automation for clips and the display configuration of
//! automation lanes.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::keyframe::{locate, CurvePoint, CurvePosition, TIME_EPSILON};
use crate::PointId;

/// A single sample of a continuous parameter curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationPoint {
    pub id: PointId,
    /// Seconds from clip start
    pub time: f64,
    /// In the parameter's own units, not clamped to the display range
    pub value: f64,
    /// Easing into the next point
    #[serde(default)]
    pub easing: Easing,
}

impl AutomationPoint {
    pub fn new(id: PointId, time: f64, value: f64) -> Self {
        Self {
            id,
            time,
            value,
            easing: Easing::default(),
        }
    }
}

impl CurvePoint for AutomationPoint {
    fn time(&self) -> f64 {
        self.time
    }
    fn easing(&self) -> Easing {
        self.easing
    }
}

/// Automation for one parameter of a clip. Points are always sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipAutomation {
    pub param_name: String,
    points: Vec<AutomationPoint>,
}

impl ClipAutomation {
    pub fn new(param_name: impl Into<String>) -> Self {
        Self {
            param_name: param_name.into(),
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[AutomationPoint] {
        &self.points
    }

    pub fn point(&self, id: PointId) -> Option<&AutomationPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert a point, or edit the point already within [`TIME_EPSILON`] of
    /// `time`. Returns the id of the stored point (the existing id on edit).
    /// Every other point within the tolerance is dropped.
    pub fn insert_point(&mut self, id: PointId, time: f64, value: f64, easing: Easing) -> PointId {
        let near = |p: &AutomationPoint| (p.time - time).abs() < TIME_EPSILON;
        let stored_id = self.points.iter().find(|p| near(p)).map_or(id, |p| p.id);
        self.points.retain(|p| !near(p));
        self.points.push(AutomationPoint {
            id: stored_id,
            time,
            value,
            easing,
        });
        self.sort();
        stored_id
    }

    pub fn remove_point(&mut self, id: PointId) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.id != id);
        self.points.len() != before
    }

    pub fn remove_point_at(&mut self, time: f64) -> bool {
        let before = self.points.len();
        self.points.retain(|p| (p.time - time).abs() >= TIME_EPSILON);
        self.points.len() != before
    }

    /// Move a point in time and value. Another point already at the target
    /// time is replaced.
    pub fn move_point(&mut self, id: PointId, time: f64, value: f64) -> bool {
        if !self.points.iter().any(|p| p.id == id) {
            return false;
        }
        self.points
            .retain(|p| p.id == id || (p.time - time).abs() >= TIME_EPSILON);
        if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
            point.time = time;
            point.value = value;
        }
        self.sort();
        true
    }

    pub fn set_easing(&mut self, id: PointId, easing: Easing) -> bool {
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(point) => {
                point.easing = easing;
                true
            }
            None => false,
        }
    }

    /// Clamp every point's time into `[0, max_time]` and restore order.
    /// Points that land within [`TIME_EPSILON`] of each other collapse into
    /// the later one, which keeps its id.
    pub fn clamp_times(&mut self, max_time: f64) {
        for point in &mut self.points {
            point.time = point.time.clamp(0.0, max_time);
        }
        self.sort();
        self.merge_near_duplicates();
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn max_point_id(&self) -> Option<PointId> {
        self.points.iter().map(|p| p.id).max()
    }

    /// Sample the curve at `t` (seconds from clip start).
    pub fn value_at(&self, t: f64) -> Option<f64> {
        match locate(&self.points, t)? {
            CurvePosition::Hold(p) => Some(p.value),
            CurvePosition::Between(p1, p2, u) => {
                Some(p1.value + (p2.value - p1.value) * p1.easing.evaluate(u))
            }
        }
    }

    /// Restore sorted order. Called after every mutation and after load.
    pub fn sort(&mut self) {
        self.points.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Expects sorted points.
    fn merge_near_duplicates(&mut self) {
        let mut merged: Vec<AutomationPoint> = Vec::with_capacity(self.points.len());
        for point in self.points.drain(..) {
            match merged.last_mut() {
                Some(prev) if (point.time - prev.time).abs() < TIME_EPSILON => *prev = point,
                _ => merged.push(point),
            }
        }
        self.points = merged;
    }
}

/// Display configuration for one automated parameter of a track or clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterLaneConfig {
    pub param_index: usize,
    pub param_name: String,
    pub collapsed: bool,
    /// Display range, independent of the parameter's semantic range
    pub min: f64,
    pub max: f64,
}

impl ParameterLaneConfig {
    pub fn new(param_index: usize, param_name: impl Into<String>) -> Self {
        let param_name = param_name.into();
        let (min, max) = default_param_range(&param_name);
        Self {
            param_index,
            param_name,
            collapsed: false,
            min,
            max,
        }
    }

    /// Map a value into `[0, 1]` relative to the display range.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Inverse of [`normalize`](Self::normalize).
    pub fn denormalize(&self, normalized: f64) -> f64 {
        self.min + normalized * (self.max - self.min)
    }
}

/// Default display range for a parameter, looked up by name.
pub fn default_param_range(param_name: &str) -> (f64, f64) {
    match param_name.to_ascii_lowercase().as_str() {
        "frequency" | "freq" | "cutoff" | "filter_cutoff" => (20.0, 20_000.0),
        "amplitude" | "amp" | "gain" | "volume" | "level" | "mix" | "resonance" | "sustain" => {
            (0.0, 1.0)
        }
        "pan" => (-1.0, 1.0),
        "attack" | "decay" => (0.001, 2.0),
        "release" => (0.001, 5.0),
        "detune" => (-100.0, 100.0),
        "pitch" | "transpose" => (-24.0, 24.0),
        "rate" | "speed" | "lfo_rate" => (0.1, 32.0),
        "hue" | "rotation" => (0.0, 360.0),
        "bpm" | "tempo" => (20.0, 300.0),
        _ => (0.0, 1.0),
    }
}

/// Resync lane configs with the current parameter names. Existing lanes keep
/// their collapsed state and display range; new names get defaults; lanes for
/// vanished names are dropped.
pub fn rebuild_lanes(existing: &[ParameterLaneConfig], param_names: &[String]) -> Vec<ParameterLaneConfig> {
    param_names
        .iter()
        .enumerate()
        .map(|(index, name)| match existing.iter().find(|l| &l.param_name == name) {
            Some(lane) => ParameterLaneConfig {
                param_index: index,
                ..lane.clone()
            },
            None => ParameterLaneConfig::new(index, name.clone()),
        })
        .collect()
}

pub(crate) fn set_lane_collapsed(lanes: &mut [ParameterLaneConfig], param_index: usize, collapsed: bool) -> bool {
    match lanes.iter_mut().find(|l| l.param_index == param_index) {
        Some(lane) => {
            lane.collapsed = collapsed;
            true
        }
        None => false,
    }
}

/// Set a lane's display range. Bounds are ordered; non-finite bounds are
/// refused.
pub(crate) fn set_lane_range(lanes: &mut [ParameterLaneConfig], param_index: usize, min: f64, max: f64) -> bool {
    if !(min.is_finite() && max.is_finite()) {
        return false;
    }
    match lanes.iter_mut().find(|l| l.param_index == param_index) {
        Some(lane) => {
            lane.min = min.min(max);
            lane.max = min.max(max);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn lane_with(points: &[(f64, f64)]) -> ClipAutomation {
        let mut lane = ClipAutomation::new("cutoff");
        for (i, (t, v)) in points.iter().enumerate() {
            lane.insert_point(PointId::new(i as u32), *t, *v, Easing::Linear);
        }
        lane
    }

    #[test]
    fn linear_lane_scenario() {
        let lane = lane_with(&[(0.0, 0.2), (2.0, 0.8), (4.0, 0.1)]);
        assert_abs_diff_eq!(lane.value_at(1.0).unwrap(), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(lane.value_at(-1.0).unwrap(), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(lane.value_at(10.0).unwrap(), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn points_sorted_after_insert_and_move() {
        let mut lane = lane_with(&[(3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let times: Vec<f64> = lane.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);

        assert!(lane.move_point(PointId::new(0), 0.5, 1.0));
        let times: Vec<f64> = lane.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.5, 1.0, 2.0]);
        assert_eq!(lane.points()[0].id, PointId::new(0));
    }

    #[test]
    fn insert_between_close_points_leaves_one() {
        let mut lane = lane_with(&[(1.0, 0.1), (1.0015, 0.2)]);
        let id = lane.insert_point(PointId::new(9), 1.0009, 0.3, Easing::Linear);
        assert_eq!(id, PointId::new(0));
        assert_eq!(lane.points().len(), 1);
        assert_eq!(lane.points()[0].time, 1.0009);
    }

    #[test]
    fn clamp_collapses_points_at_the_new_end() {
        let mut lane = lane_with(&[(0.5, 0.0), (1.9995, 0.1), (3.0, 0.2), (3.5, 0.9)]);
        lane.clamp_times(2.0);
        let times: Vec<f64> = lane.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.5, 2.0]);
        // The latest point survives with its own id
        assert_eq!(lane.points()[1].id, PointId::new(3));
        assert_abs_diff_eq!(lane.points()[1].value, 0.9);
    }

    #[test]
    fn insert_near_duplicate_edits_existing_point() {
        let mut lane = lane_with(&[(1.0, 0.3)]);
        let id = lane.insert_point(PointId::new(9), 1.0002, 0.7, Easing::Step);
        assert_eq!(id, PointId::new(0));
        assert_eq!(lane.points().len(), 1);
        assert_abs_diff_eq!(lane.points()[0].value, 0.7);
        assert_eq!(lane.points()[0].easing, Easing::Step);
    }

    #[test]
    fn move_onto_other_point_replaces_it() {
        let mut lane = lane_with(&[(0.0, 0.1), (1.0, 0.2), (2.0, 0.3)]);
        assert!(lane.move_point(PointId::new(0), 2.0, 0.9));
        assert_eq!(lane.points().len(), 2);
        assert_eq!(lane.points()[1].id, PointId::new(0));
        assert!(!lane.move_point(PointId::new(42), 0.0, 0.0));
    }

    #[test]
    fn remove_by_id_and_time() {
        let mut lane = lane_with(&[(0.0, 0.1), (1.0, 0.2)]);
        assert!(lane.remove_point(PointId::new(1)));
        assert!(!lane.remove_point(PointId::new(1)));
        assert!(lane.remove_point_at(0.0004));
        assert!(lane.is_empty());
        assert!(lane.value_at(0.0).is_none());
    }

    #[test]
    fn clamp_times_restores_bounds() {
        let mut lane = lane_with(&[(-1.0, 0.1), (9.0, 0.2)]);
        lane.clamp_times(4.0);
        assert_eq!(lane.points()[0].time, 0.0);
        assert_eq!(lane.points()[1].time, 4.0);
    }

    #[test]
    fn default_ranges_fall_back_to_unit() {
        assert_eq!(default_param_range("Cutoff"), (20.0, 20_000.0));
        assert_eq!(default_param_range("pan"), (-1.0, 1.0));
        assert_eq!(default_param_range("mystery"), (0.0, 1.0));
    }

    #[test]
    fn lane_normalization() {
        let lane = ParameterLaneConfig::new(0, "pan");
        assert_abs_diff_eq!(lane.normalize(0.0), 0.5);
        assert_abs_diff_eq!(lane.denormalize(1.0), 1.0);
        assert_abs_diff_eq!(lane.normalize(5.0), 1.0);
    }

    #[test]
    fn rebuild_preserves_user_ranges() {
        let mut cutoff = ParameterLaneConfig::new(1, "cutoff");
        cutoff.min = 200.0;
        cutoff.max = 800.0;
        cutoff.collapsed = true;
        let existing = vec![ParameterLaneConfig::new(0, "gain"), cutoff];

        let names = vec!["cutoff".to_string(), "pan".to_string()];
        let rebuilt = rebuild_lanes(&existing, &names);

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].param_name, "cutoff");
        assert_eq!(rebuilt[0].param_index, 0);
        assert_eq!((rebuilt[0].min, rebuilt[0].max), (200.0, 800.0));
        assert!(rebuilt[0].collapsed);
        assert_eq!(rebuilt[1].param_name, "pan");
        assert_eq!((rebuilt[1].min, rebuilt[1].max), (-1.0, 1.0));
    }
}
