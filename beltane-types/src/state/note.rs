use serde::{Deserialize, Serialize};

use crate::NoteId;

/// Shortest duration a note can be edited down to (seconds).
pub const MIN_NOTE_DURATION: f64 = 0.1;

/// A single time-stamped event inside a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerNote {
    pub id: NoteId,
    /// Seconds from the owning clip's origin
    pub start_time: f64,
    pub duration: f64,
    pub frequency: f64,
    pub amplitude: f64,
    /// Index-addressed synthesis parameters
    #[serde(default)]
    pub params: Vec<f64>,
    /// Labels for `params`. `None` inherits the owning clip's names.
    #[serde(default)]
    pub param_names: Option<Vec<String>>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub muted: bool,
}

impl SequencerNote {
    pub fn new(id: NoteId, spec: NoteSpec) -> Self {
        Self {
            id,
            start_time: spec.start_time,
            duration: spec.duration.max(MIN_NOTE_DURATION),
            frequency: spec.frequency,
            amplitude: spec.amplitude,
            params: spec.params,
            param_names: spec.param_names,
            selected: false,
            muted: false,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Set the duration, floor-clamped to [`MIN_NOTE_DURATION`].
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(MIN_NOTE_DURATION);
    }

    /// Write `params[index]`, growing the list with zeros when needed.
    pub fn set_param(&mut self, index: usize, value: f64) {
        if self.params.len() <= index {
            self.params.resize(index + 1, 0.0);
        }
        self.params[index] = value;
    }

    /// The labels for this note's params, falling back to the clip's.
    pub fn effective_param_names<'a>(&'a self, clip_param_names: &'a [String]) -> &'a [String] {
        self.param_names.as_deref().unwrap_or(clip_param_names)
    }

    pub fn overlaps(&self, other: &SequencerNote) -> bool {
        self.start_time < other.end_time() && other.start_time < self.end_time()
    }
}

/// Everything needed to create a note, minus its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub start_time: f64,
    pub duration: f64,
    pub frequency: f64,
    pub amplitude: f64,
    #[serde(default)]
    pub params: Vec<f64>,
    #[serde(default)]
    pub param_names: Option<Vec<String>>,
}

impl NoteSpec {
    pub fn new(start_time: f64, duration: f64) -> Self {
        Self {
            start_time,
            duration,
            ..Self::default()
        }
    }

    pub fn with_pitch(mut self, frequency: f64, amplitude: f64) -> Self {
        self.frequency = frequency;
        self.amplitude = amplitude;
        self
    }

    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }

    /// False when any number in the spec is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [self.start_time, self.duration, self.frequency, self.amplitude]
            .iter()
            .chain(&self.params)
            .all(|v| v.is_finite())
    }
}

impl Default for NoteSpec {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            duration: 0.5,
            frequency: 440.0,
            amplitude: 0.8,
            params: Vec::new(),
            param_names: None,
        }
    }
}

impl From<&SequencerNote> for NoteSpec {
    fn from(note: &SequencerNote) -> Self {
        Self {
            start_time: note.start_time,
            duration: note.duration,
            frequency: note.frequency,
            amplitude: note.amplitude,
            params: note.params.clone(),
            param_names: note.param_names.clone(),
        }
    }
}

/// A note as handed to the playback runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_time: f64,
    pub duration: f64,
    pub frequency: f64,
    pub amplitude: f64,
    pub params: Vec<f64>,
}

impl From<&SequencerNote> for NoteEvent {
    fn from(note: &SequencerNote) -> Self {
        Self {
            start_time: note.start_time,
            duration: note.duration,
            frequency: note.frequency,
            amplitude: note.amplitude,
            params: note.params.clone(),
        }
    }
}
