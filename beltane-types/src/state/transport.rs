//! Transport configuration and quantization. The running cursor lives in
//! `beltane-core`; only the persisted settings live here.

use serde::{Deserialize, Serialize};

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Quantization grid for snapping edit times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    None,
    #[default]
    Beat,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl SnapMode {
    pub const ALL: [SnapMode; 6] = [
        SnapMode::None,
        SnapMode::Beat,
        SnapMode::Half,
        SnapMode::Quarter,
        SnapMode::Eighth,
        SnapMode::Sixteenth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SnapMode::None => "none",
            SnapMode::Beat => "beat",
            SnapMode::Half => "half",
            SnapMode::Quarter => "quarter",
            SnapMode::Eighth => "eighth",
            SnapMode::Sixteenth => "sixteenth",
        }
    }

    pub fn from_name(name: &str) -> Option<SnapMode> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Fraction of a beat covered by one grid step, or `None` for no snap.
    fn beat_fraction(self) -> Option<f64> {
        match self {
            SnapMode::None => None,
            SnapMode::Beat => Some(1.0),
            SnapMode::Half => Some(0.5),
            SnapMode::Quarter => Some(0.25),
            SnapMode::Eighth => Some(0.125),
            SnapMode::Sixteenth => Some(0.0625),
        }
    }

    /// Grid step in seconds at `bpm`.
    pub fn grid_seconds(self, bpm: f64) -> Option<f64> {
        let beat = 60.0 / bpm.clamp(MIN_BPM, MAX_BPM);
        self.beat_fraction().map(|f| beat * f)
    }

    /// Round `t` to the nearest grid line. `None` is the identity.
    pub fn snap_time(self, t: f64, bpm: f64) -> f64 {
        match self.grid_seconds(bpm) {
            Some(step) => (t / step).round() * step,
            None => t,
        }
    }
}

/// Persisted transport settings. BPM only affects snapping; playback time
/// is always real seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub bpm: f64,
    #[serde(default)]
    pub snap_mode: SnapMode,
    #[serde(default)]
    pub loop_enabled: bool,
    #[serde(default)]
    pub loop_start: f64,
    #[serde(default)]
    pub loop_end: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            snap_mode: SnapMode::Beat,
            loop_enabled: false,
            loop_start: 0.0,
            loop_end: 0.0,
        }
    }
}

impl TransportConfig {
    /// Clamped to [`MIN_BPM`]..=[`MAX_BPM`]. Returns false, leaving the
    /// tempo alone, for NaN or infinite input.
    pub fn set_bpm(&mut self, bpm: f64) -> bool {
        if !bpm.is_finite() {
            return false;
        }
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        true
    }

    /// Set the loop region. Bounds are ordered and floored at zero.
    /// Returns false for NaN or infinite bounds.
    pub fn set_loop(&mut self, start: f64, end: f64) -> bool {
        if !(start.is_finite() && end.is_finite()) {
            return false;
        }
        let (a, b) = if start <= end { (start, end) } else { (end, start) };
        self.loop_start = a.max(0.0);
        self.loop_end = b.max(0.0);
        true
    }

    /// A loop only takes effect when enabled and non-empty.
    pub fn loop_active(&self) -> bool {
        self.loop_enabled && self.loop_end > self.loop_start
    }

    pub fn snap_time(&self, t: f64) -> f64 {
        self.snap_mode.snap_time(t, self.bpm)
    }

    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if !self.set_bpm(self.bpm) {
            self.bpm = defaults.bpm;
        }
        if !self.set_loop(self.loop_start, self.loop_end) {
            self.loop_start = defaults.loop_start;
            self.loop_end = defaults.loop_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn snap_none_is_identity() {
        assert_eq!(SnapMode::None.snap_time(1.2345, 120.0), 1.2345);
    }

    #[test]
    fn snap_rounds_to_nearest_grid_line() {
        // 120 bpm: beat = 0.5s
        assert_abs_diff_eq!(SnapMode::Beat.snap_time(0.74, 120.0), 0.5);
        assert_abs_diff_eq!(SnapMode::Beat.snap_time(0.76, 120.0), 1.0);
        assert_abs_diff_eq!(SnapMode::Half.snap_time(0.3, 120.0), 0.25);
        assert_abs_diff_eq!(SnapMode::Quarter.snap_time(0.13, 120.0), 0.125);
        assert_abs_diff_eq!(SnapMode::Sixteenth.snap_time(0.04, 120.0), 0.03125);
    }

    #[test]
    fn snap_follows_bpm() {
        // 60 bpm: beat = 1s
        assert_abs_diff_eq!(SnapMode::Beat.snap_time(1.4, 60.0), 1.0);
        assert_abs_diff_eq!(SnapMode::Eighth.snap_time(0.2, 60.0), 0.25);
    }

    #[test]
    fn bpm_is_clamped() {
        let mut cfg = TransportConfig::default();
        cfg.set_bpm(5.0);
        assert_eq!(cfg.bpm, MIN_BPM);
        cfg.set_bpm(5000.0);
        assert_eq!(cfg.bpm, MAX_BPM);
    }

    #[test]
    fn non_finite_settings_are_refused() {
        let mut cfg = TransportConfig::default();
        assert!(!cfg.set_bpm(f64::NAN));
        assert!(!cfg.set_bpm(f64::INFINITY));
        assert_eq!(cfg.bpm, 120.0);
        assert!(!cfg.set_loop(1.0, f64::INFINITY));
        assert_eq!((cfg.loop_start, cfg.loop_end), (0.0, 0.0));
    }

    #[test]
    fn loop_bounds_are_ordered() {
        let mut cfg = TransportConfig::default();
        cfg.set_loop(8.0, 2.0);
        assert_eq!((cfg.loop_start, cfg.loop_end), (2.0, 8.0));
        assert!(!cfg.loop_active());
        cfg.loop_enabled = true;
        assert!(cfg.loop_active());
        cfg.set_loop(3.0, 3.0);
        assert!(!cfg.loop_active());
    }

    #[test]
    fn snap_mode_names() {
        for mode in SnapMode::ALL {
            assert_eq!(SnapMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(SnapMode::from_name("triplet"), None);
    }
}
