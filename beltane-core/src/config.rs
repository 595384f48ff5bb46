use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::layout::LayoutConfig;
use crate::state::undo::HistorySettings;
use beltane_types::{SnapMode, TransportConfig};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    layout: LayoutFileConfig,
    #[serde(default)]
    history: HistoryConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    bpm: Option<f64>,
    snap_mode: Option<String>,
    loop_enabled: Option<bool>,
    loop_start: Option<f64>,
    loop_end: Option<f64>,
    clip_duration: Option<f64>,
    note_duration: Option<f64>,
}

#[derive(Deserialize, Default)]
struct LayoutFileConfig {
    default_track_height: Option<f64>,
    expanded_track_height: Option<f64>,
    section_header_height: Option<f64>,
    overscan: Option<usize>,
}

#[derive(Deserialize, Default)]
struct HistoryConfig {
    max_depth: Option<usize>,
    coalesce_window_ms: Option<u64>,
}

pub struct Config {
    defaults: DefaultsConfig,
    layout: LayoutFileConfig,
    history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Config {
    /// Embedded defaults overlaid with `$CONFIG_DIR/beltane/config.toml`.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults overlaid with the file at `user_path`, if any.
    pub fn load_from(user_path: Option<&Path>) -> Self {
        let mut base = Self::embedded();

        if let Some(path) = user_path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_defaults(&mut base.defaults, user.defaults);
                            merge_layout(&mut base.layout, user.layout);
                            merge_history(&mut base.history, user.history);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        base
    }

    fn embedded() -> Self {
        let file = match toml::from_str::<ConfigFile>(DEFAULT_CONFIG) {
            Ok(file) => file,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is malformed: {}", e);
                ConfigFile::default()
            }
        };
        Config {
            defaults: file.defaults,
            layout: file.layout,
            history: file.history,
        }
    }

    /// Transport settings for new sessions.
    pub fn transport(&self) -> TransportConfig {
        let fallback = TransportConfig::default();
        let mut config = TransportConfig {
            bpm: self.defaults.bpm.unwrap_or(fallback.bpm),
            snap_mode: self
                .defaults
                .snap_mode
                .as_deref()
                .and_then(parse_snap_mode)
                .unwrap_or(fallback.snap_mode),
            loop_enabled: self.defaults.loop_enabled.unwrap_or(fallback.loop_enabled),
            loop_start: self.defaults.loop_start.unwrap_or(fallback.loop_start),
            loop_end: self.defaults.loop_end.unwrap_or(fallback.loop_end),
        };
        config.sanitize();
        config
    }

    /// Length of newly created clips, in seconds.
    pub fn clip_duration(&self) -> f64 {
        self.defaults
            .clip_duration
            .filter(|d| d.is_finite())
            .unwrap_or(4.0)
            .max(beltane_types::MIN_CLIP_DURATION)
    }

    /// Length of newly created notes, in seconds.
    pub fn note_duration(&self) -> f64 {
        self.defaults
            .note_duration
            .filter(|d| d.is_finite())
            .unwrap_or(0.5)
            .max(beltane_types::MIN_NOTE_DURATION)
    }

    pub fn layout(&self) -> LayoutConfig {
        let fallback = LayoutConfig::default();
        let default_track_height = self
            .layout
            .default_track_height
            .filter(|h| *h > 0.0)
            .unwrap_or(fallback.default_track_height);
        LayoutConfig {
            default_track_height,
            // An expanded track is never shorter than a collapsed one
            expanded_track_height: self
                .layout
                .expanded_track_height
                .unwrap_or(fallback.expanded_track_height)
                .max(default_track_height),
            section_header_height: self
                .layout
                .section_header_height
                .unwrap_or(fallback.section_header_height)
                .max(0.0),
            overscan: self.layout.overscan.unwrap_or(fallback.overscan),
        }
    }

    /// Undo history bounds (depth clamped to 1..10000).
    pub fn history(&self) -> HistorySettings {
        let fallback = HistorySettings::default();
        HistorySettings {
            max_depth: self
                .history
                .max_depth
                .unwrap_or(fallback.max_depth)
                .clamp(1, 10_000),
            coalesce_window: self
                .history
                .coalesce_window_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.coalesce_window),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beltane").join("config.toml"))
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.bpm.is_some() {
        base.bpm = user.bpm;
    }
    if user.snap_mode.is_some() {
        base.snap_mode = user.snap_mode;
    }
    if user.loop_enabled.is_some() {
        base.loop_enabled = user.loop_enabled;
    }
    if user.loop_start.is_some() {
        base.loop_start = user.loop_start;
    }
    if user.loop_end.is_some() {
        base.loop_end = user.loop_end;
    }
    if user.clip_duration.is_some() {
        base.clip_duration = user.clip_duration;
    }
    if user.note_duration.is_some() {
        base.note_duration = user.note_duration;
    }
}

fn merge_layout(base: &mut LayoutFileConfig, user: LayoutFileConfig) {
    if user.default_track_height.is_some() {
        base.default_track_height = user.default_track_height;
    }
    if user.expanded_track_height.is_some() {
        base.expanded_track_height = user.expanded_track_height;
    }
    if user.section_header_height.is_some() {
        base.section_header_height = user.section_header_height;
    }
    if user.overscan.is_some() {
        base.overscan = user.overscan;
    }
}

fn merge_history(base: &mut HistoryConfig, user: HistoryConfig) {
    if user.max_depth.is_some() {
        base.max_depth = user.max_depth;
    }
    if user.coalesce_window_ms.is_some() {
        base.coalesce_window_ms = user.coalesce_window_ms;
    }
}

fn parse_snap_mode(s: &str) -> Option<SnapMode> {
    SnapMode::from_name(&s.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_embedded_config() {
        let config = Config::load_from(None);
        let transport = config.transport();
        assert!((transport.bpm - 120.0).abs() < 0.01);
        assert_eq!(transport.snap_mode, SnapMode::Beat);
        assert!(!transport.loop_enabled);
        assert!((transport.loop_end - 8.0).abs() < 0.01);
        assert!((config.clip_duration() - 4.0).abs() < 0.01);
        assert!((config.note_duration() - 0.5).abs() < 0.01);

        let layout = config.layout();
        assert!((layout.default_track_height - 48.0).abs() < 0.01);
        assert!((layout.expanded_track_height - 160.0).abs() < 0.01);
        assert!((layout.section_header_height - 24.0).abs() < 0.01);
        assert_eq!(layout.overscan, 3);

        let history = config.history();
        assert_eq!(history.max_depth, 100);
        assert_eq!(history.coalesce_window, Duration::from_millis(500));
    }

    #[test]
    fn test_user_file_overrides_field_by_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[defaults]\nbpm = 90.0\nsnap_mode = \"Sixteenth\"\n\n[layout]\noverscan = 6\n"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path()));
        let transport = config.transport();
        assert!((transport.bpm - 90.0).abs() < 0.01);
        assert_eq!(transport.snap_mode, SnapMode::Sixteenth);
        // Untouched keys keep the embedded value
        assert!((transport.loop_end - 8.0).abs() < 0.01);
        assert_eq!(config.layout().overscan, 6);
        assert!((config.layout().default_track_height - 48.0).abs() < 0.01);
    }

    #[test]
    fn test_malformed_user_file_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults\nbpm = ").unwrap();
        let config = Config::load_from(Some(file.path()));
        assert!((config.transport().bpm - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_missing_user_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(dir.path().join("nope.toml").as_path()));
        assert_eq!(config.history().max_depth, 100);
    }

    #[test]
    fn test_nonsense_values_are_clamped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[defaults]\nbpm = 4000.0\nloop_start = 9.0\nloop_end = 1.0\nclip_duration = 0.0\n\n\
             [layout]\ndefault_track_height = 60.0\nexpanded_track_height = 20.0\n\n\
             [history]\nmax_depth = 0\n"
        )
        .unwrap();
        let config = Config::load_from(Some(file.path()));
        let transport = config.transport();
        assert!((transport.bpm - 999.0).abs() < 0.01);
        assert!(transport.loop_start < transport.loop_end);
        assert!((config.clip_duration() - 0.1).abs() < 1e-9);
        assert!((config.layout().expanded_track_height - 60.0).abs() < 0.01);
        assert_eq!(config.history().max_depth, 1);
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[defaults]\nbpm = nan\nloop_end = inf\nclip_duration = inf\nnote_duration = inf\n"
        )
        .unwrap();
        let config = Config::load_from(Some(file.path()));
        let transport = config.transport();
        assert!((transport.bpm - 120.0).abs() < 0.01);
        assert!(transport.loop_end.is_finite());
        assert!((config.clip_duration() - 4.0).abs() < 1e-9);
        assert!((config.note_duration() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_snap_mode() {
        assert_eq!(parse_snap_mode("half"), Some(SnapMode::Half));
        assert_eq!(parse_snap_mode("QUARTER"), Some(SnapMode::Quarter));
        assert_eq!(parse_snap_mode("bar"), None);
    }
}
