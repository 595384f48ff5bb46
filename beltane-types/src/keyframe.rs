//! Time-ordered keyframe curves.
//!
//! A [`KeyframeTrack`] keeps its keyframes sorted by time after every
//! mutation. Sampling finds the bracketing pair, eases the local progress with
//! the earlier keyframe's [`Easing`], and blends the two values with the
//! value type's [`Interpolate`] implementation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::easing::Easing;

/// Two times closer than this are the same keyframe position (seconds).
pub const TIME_EPSILON: f64 = 1e-3;

/// Blend between two values given eased progress `u`.
///
/// The default is a step: hold `from` until `u` reaches 1.
pub trait Interpolate: Clone {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        if u >= 1.0 {
            to.clone()
        } else {
            from.clone()
        }
    }
}

impl Interpolate for f64 {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        from + (to - from) * u
    }
}

impl Interpolate for f32 {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        from + (to - from) * u as f32
    }
}

impl<const N: usize> Interpolate for [f64; N] {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        let mut out = *from;
        for (o, (a, b)) in out.iter_mut().zip(from.iter().zip(to.iter())) {
            *o = a + (b - a) * u;
        }
        out
    }
}

impl Interpolate for Vec<f64> {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        if from.len() != to.len() {
            return if u >= 1.0 { to.clone() } else { from.clone() };
        }
        from.iter().zip(to).map(|(a, b)| a + (b - a) * u).collect()
    }
}

impl Interpolate for bool {}
impl Interpolate for String {}

/// Dynamically-typed keyframe value, used for persisted environment curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Number(f64),
    Vector(Vec<f64>),
    Text(String),
}

impl KeyframeValue {
    /// False when any number in the value is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            KeyframeValue::Number(v) => v.is_finite(),
            KeyframeValue::Vector(vs) => vs.iter().all(|v| v.is_finite()),
            KeyframeValue::Text(_) => true,
        }
    }
}

impl Interpolate for KeyframeValue {
    fn interpolate(from: &Self, to: &Self, u: f64) -> Self {
        match (from, to) {
            (KeyframeValue::Number(a), KeyframeValue::Number(b)) => {
                KeyframeValue::Number(f64::interpolate(a, b, u))
            }
            (KeyframeValue::Vector(a), KeyframeValue::Vector(b)) => {
                KeyframeValue::Vector(Vec::interpolate(a, b, u))
            }
            _ if u >= 1.0 => to.clone(),
            _ => from.clone(),
        }
    }
}

/// Anything placed on a timeline with an outgoing easing.
pub trait CurvePoint {
    fn time(&self) -> f64;
    fn easing(&self) -> Easing;
}

/// Where a sample time falls relative to a sorted point list.
#[derive(Debug)]
pub enum CurvePosition<'a, P> {
    /// Before the first point, after the last, or on a single point.
    Hold(&'a P),
    /// Strictly inside a segment, with raw (un-eased) local progress.
    Between(&'a P, &'a P, f64),
}

/// Locate `t` within `points`, which must be sorted ascending by time.
pub fn locate<P: CurvePoint>(points: &[P], t: f64) -> Option<CurvePosition<'_, P>> {
    let first = points.first()?;
    let last = points.last()?;
    if t <= first.time() {
        return Some(CurvePosition::Hold(first));
    }
    if t >= last.time() {
        return Some(CurvePosition::Hold(last));
    }

    let next = points.partition_point(|p| p.time() <= t);
    let (kf1, kf2) = (&points[next - 1], &points[next]);
    let span = kf2.time() - kf1.time();
    if span <= 0.0 {
        return Some(CurvePosition::Hold(kf2));
    }
    Some(CurvePosition::Between(kf1, kf2, (t - kf1.time()) / span))
}

/// A single keyframe: a value at a time, easing into the next keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
    #[serde(default)]
    pub easing: Easing,
}

impl<T> CurvePoint for Keyframe<T> {
    fn time(&self) -> f64 {
        self.time
    }
    fn easing(&self) -> Easing {
        self.easing
    }
}

/// Sorted keyframe collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyframeTrack<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self { keyframes: Vec::new() }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyframeTrack<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keyframes = Vec::<Keyframe<T>>::deserialize(deserializer)?;
        Ok(Self::from_keyframes(keyframes))
    }
}

impl<T> KeyframeTrack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary list. Sorts, and collapses near-duplicate
    /// times keeping the later entry.
    pub fn from_keyframes(keyframes: Vec<Keyframe<T>>) -> Self {
        let mut track = Self { keyframes };
        track.normalize();
        track
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe<T>> {
        self.keyframes.get(index)
    }

    /// Index of the keyframe within [`TIME_EPSILON`] of `time`.
    pub fn index_near(&self, time: f64) -> Option<usize> {
        self.keyframes
            .iter()
            .position(|k| (k.time - time).abs() < TIME_EPSILON)
    }

    /// Insert a keyframe, replacing every keyframe within [`TIME_EPSILON`]
    /// of `time`. Returns the keyframe's index after sorting.
    pub fn insert(&mut self, time: f64, value: T, easing: Easing) -> usize {
        self.keyframes
            .retain(|k| (k.time - time).abs() >= TIME_EPSILON);
        self.keyframes.push(Keyframe { time, value, easing });
        self.sort();
        self.index_near(time).unwrap_or(0)
    }

    pub fn remove_at_time(&mut self, time: f64) -> Option<Keyframe<T>> {
        let index = self.index_near(time)?;
        Some(self.keyframes.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Keyframe<T>> {
        if index < self.keyframes.len() {
            Some(self.keyframes.remove(index))
        } else {
            None
        }
    }

    /// Move keyframe `index` to `new_time`. A different keyframe already at
    /// that time is replaced. Returns the new index.
    pub fn move_keyframe(&mut self, index: usize, new_time: f64) -> Option<usize> {
        if index >= self.keyframes.len() {
            return None;
        }
        let mut moved = self.keyframes.remove(index);
        moved.time = new_time;
        self.keyframes
            .retain(|k| (k.time - new_time).abs() >= TIME_EPSILON);
        self.keyframes.push(moved);
        self.sort();
        self.index_near(new_time)
    }

    pub fn set_easing(&mut self, index: usize, easing: Easing) -> bool {
        match self.keyframes.get_mut(index) {
            Some(k) => {
                k.easing = easing;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Time of the last keyframe, or 0 for an empty track.
    pub fn end_time(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    fn sort(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    fn normalize(&mut self) {
        self.sort();
        let mut merged: Vec<Keyframe<T>> = Vec::with_capacity(self.keyframes.len());
        for k in self.keyframes.drain(..) {
            match merged.last_mut() {
                Some(prev) if (k.time - prev.time).abs() < TIME_EPSILON => *prev = k,
                _ => merged.push(k),
            }
        }
        self.keyframes = merged;
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Sample the curve at `t`. `None` only when the track is empty.
    pub fn value_at(&self, t: f64) -> Option<T> {
        match locate(&self.keyframes, t)? {
            CurvePosition::Hold(k) => Some(k.value.clone()),
            CurvePosition::Between(kf1, kf2, u) => {
                Some(T::interpolate(&kf1.value, &kf2.value, kf1.easing.evaluate(u)))
            }
        }
    }
}
