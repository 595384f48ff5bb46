//! The arrangement data store: tracks, clips, clip instances, notes,
//! clip automation and environment curves.
//!
//! Operations that name a missing id are no-ops returning `None`/`false`.
//! Out-of-range times and durations are clamped on write. NaN and infinite
//! inputs are refused the same way as a missing id, since a snapshot could
//! not carry them.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::automation::{set_lane_collapsed, set_lane_range, ClipAutomation};
use super::clip::{ClipInstance, SequencerClip, MIN_CLIP_DURATION};
use super::note::{NoteEvent, NoteSpec, SequencerNote};
use super::track::{palette_color, ArrangementTrack};
use crate::easing::Easing;
use crate::keyframe::{KeyframeTrack, KeyframeValue};
use crate::{ClipId, InstanceId, NoteId, PointId, TrackId};

/// Top-level arrangement state. Owned by SessionState.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementState {
    pub tracks: Vec<ArrangementTrack>,
    pub clips: Vec<SequencerClip>,
    pub instances: Vec<ClipInstance>,
    /// Named scene/camera curves that are not scoped to a clip
    #[serde(default)]
    pub environment: BTreeMap<String, KeyframeTrack<KeyframeValue>>,

    #[serde(default = "first_id")]
    pub(crate) next_track_id: u32,
    #[serde(default = "first_id")]
    pub(crate) next_clip_id: u32,
    #[serde(default = "first_id")]
    pub(crate) next_instance_id: u32,
    #[serde(default = "first_id")]
    pub(crate) next_note_id: u32,
    #[serde(default = "first_id")]
    pub(crate) next_point_id: u32,
}

fn first_id() -> u32 {
    1
}

impl Default for ArrangementState {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrangementState {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            clips: Vec::new(),
            instances: Vec::new(),
            environment: BTreeMap::new(),
            next_track_id: 1,
            next_clip_id: 1,
            next_instance_id: 1,
            next_note_id: 1,
            next_point_id: 1,
        }
    }

    // ---- Tracks ----

    pub fn add_track(&mut self, name: String, synth_name: String) -> TrackId {
        let id = TrackId::new(self.next_track_id);
        self.next_track_id += 1;
        let color = palette_color(self.tracks.len());
        self.tracks.push(ArrangementTrack::new(id, name, synth_name, color));
        id
    }

    /// Return the track at `index`, creating empty tracks up to it if needed.
    pub fn ensure_track(&mut self, index: usize) -> TrackId {
        while self.tracks.len() <= index {
            let name = format!("Track {}", self.tracks.len() + 1);
            self.add_track(name, String::new());
        }
        self.tracks[index].id
    }

    /// Return the first track bound to `synth_name`, creating it if absent.
    pub fn ensure_synth_track(&mut self, synth_name: &str) -> TrackId {
        match self.tracks.iter().find(|t| t.synth_name == synth_name) {
            Some(track) => track.id,
            None => self.add_track(synth_name.to_string(), synth_name.to_string()),
        }
    }

    pub fn track(&self, id: TrackId) -> Option<&ArrangementTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut ArrangementTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Row position of a track. Resolved on demand; instances never store it.
    pub fn track_index(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Remove a track and every instance placed on it.
    pub fn remove_track(&mut self, id: TrackId) -> bool {
        let Some(pos) = self.track_index(id) else {
            return false;
        };
        self.tracks.remove(pos);
        self.instances.retain(|i| i.track_id != id);
        true
    }

    /// Move a track to `new_index` (clamped to the list end).
    pub fn move_track(&mut self, id: TrackId, new_index: usize) -> bool {
        let Some(pos) = self.track_index(id) else {
            return false;
        };
        let track = self.tracks.remove(pos);
        let target = new_index.min(self.tracks.len());
        self.tracks.insert(target, track);
        true
    }

    pub fn rebuild_automation_lanes(&mut self, id: TrackId, param_names: &[String]) -> bool {
        match self.track_mut(id) {
            Some(track) => {
                track.rebuild_automation_lanes(param_names);
                true
            }
            None => false,
        }
    }

    // ---- Clips ----

    pub fn add_clip(&mut self, name: String, synth_name: String, duration: f64) -> ClipId {
        let id = ClipId::new(self.next_clip_id);
        self.next_clip_id += 1;
        let color = palette_color(self.clips.len());
        let duration = if duration.is_finite() { duration } else { MIN_CLIP_DURATION };
        self.clips
            .push(SequencerClip::new(id, name, synth_name, duration, color));
        id
    }

    pub fn clip(&self, id: ClipId) -> Option<&SequencerClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut SequencerClip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Remove a clip with its notes and automation. Its instances go too.
    pub fn remove_clip(&mut self, id: ClipId) -> bool {
        let Some(pos) = self.clips.iter().position(|c| c.id == id) else {
            return false;
        };
        self.clips.remove(pos);
        self.instances.retain(|i| i.clip_id != id);
        true
    }

    pub fn rename_clip(&mut self, id: ClipId, name: String) -> bool {
        self.edit_clip(id, |clip| clip.name = name)
    }

    /// Set the loop length. Automation points past the new end are pulled in.
    pub fn set_clip_duration(&mut self, id: ClipId, duration: f64) -> bool {
        if !duration.is_finite() {
            return false;
        }
        self.edit_clip(id, |clip| {
            clip.duration = duration.max(MIN_CLIP_DURATION);
            let max = clip.duration;
            for lane in &mut clip.automation {
                lane.clamp_times(max);
            }
        })
    }

    /// Replace the clip's parameter names and resync its lane configs.
    pub fn set_clip_param_names(&mut self, id: ClipId, param_names: Vec<String>) -> bool {
        self.edit_clip(id, |clip| {
            clip.param_names = param_names;
            clip.rebuild_parameter_lanes();
        })
    }

    pub fn rebuild_parameter_lanes(&mut self, id: ClipId) -> bool {
        self.edit_clip(id, SequencerClip::rebuild_parameter_lanes)
    }

    pub fn set_clip_file_path(&mut self, id: ClipId, path: Option<PathBuf>) -> bool {
        self.edit_clip(id, |clip| clip.file_path = path)
    }

    pub fn set_clip_lane_collapsed(&mut self, id: ClipId, param_index: usize, collapsed: bool) -> bool {
        self.edit_clip_if(id, |clip| {
            set_lane_collapsed(&mut clip.parameter_lanes, param_index, collapsed)
        })
    }

    pub fn set_clip_lane_range(&mut self, id: ClipId, param_index: usize, min: f64, max: f64) -> bool {
        self.edit_clip_if(id, |clip| set_lane_range(&mut clip.parameter_lanes, param_index, min, max))
    }

    /// Clear the dirty flag once the clip's backing file is written.
    pub fn mark_clean(&mut self, id: ClipId) -> bool {
        match self.clip_mut(id) {
            Some(clip) => {
                clip.is_dirty = false;
                true
            }
            None => false,
        }
    }

    pub fn dirty_clips(&self) -> impl Iterator<Item = &SequencerClip> {
        self.clips.iter().filter(|c| c.is_dirty)
    }

    /// Apply `f` to a clip and mark it dirty.
    fn edit_clip<R>(&mut self, id: ClipId, f: impl FnOnce(&mut SequencerClip) -> R) -> bool {
        match self.clip_mut(id) {
            Some(clip) => {
                f(clip);
                clip.touch();
                true
            }
            None => false,
        }
    }

    // ---- Instances ----

    /// Place a clip on a track. Both must exist.
    pub fn add_instance(
        &mut self,
        clip_id: ClipId,
        track_id: TrackId,
        start_time: f64,
    ) -> Option<InstanceId> {
        if !start_time.is_finite() {
            return None;
        }
        self.clip(clip_id)?;
        self.track(track_id)?;
        let id = InstanceId::new(self.next_instance_id);
        self.next_instance_id += 1;
        self.instances.push(ClipInstance {
            id,
            clip_id,
            track_id,
            start_time: start_time.max(0.0),
        });
        Some(id)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&ClipInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn remove_instance(&mut self, id: InstanceId) -> bool {
        let before = self.instances.len();
        self.instances.retain(|i| i.id != id);
        self.instances.len() != before
    }

    /// Move an instance in time and optionally onto another existing track.
    pub fn move_instance(&mut self, id: InstanceId, track_id: Option<TrackId>, start_time: f64) -> bool {
        if !start_time.is_finite() {
            return false;
        }
        if let Some(track_id) = track_id {
            if self.track(track_id).is_none() {
                return false;
            }
        }
        match self.instances.iter_mut().find(|i| i.id == id) {
            Some(instance) => {
                instance.start_time = start_time.max(0.0);
                if let Some(track_id) = track_id {
                    instance.track_id = track_id;
                }
                true
            }
            None => false,
        }
    }

    /// Remove every instance in `ids` with a single filter pass.
    pub fn delete_instances(&mut self, ids: &BTreeSet<InstanceId>) -> usize {
        let before = self.instances.len();
        self.instances.retain(|i| !ids.contains(&i.id));
        before - self.instances.len()
    }

    /// Instances on a track, ordered by start time.
    pub fn instances_on_track(&self, track_id: TrackId) -> Vec<&ClipInstance> {
        let mut instances: Vec<&ClipInstance> = self
            .instances
            .iter()
            .filter(|i| i.track_id == track_id)
            .collect();
        instances.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        instances
    }

    pub fn instance_at(&self, track_id: TrackId, time: f64) -> Option<&ClipInstance> {
        self.instances_on_track(track_id).into_iter().find(|instance| {
            self.clip(instance.clip_id)
                .is_some_and(|clip| instance.contains(clip, time))
        })
    }

    /// Arrangement length: the latest instance end, or 0 when empty.
    pub fn duration(&self) -> f64 {
        self.instances
            .iter()
            .filter_map(|i| self.clip(i.clip_id).map(|c| i.end_time(c)))
            .fold(0.0, f64::max)
    }

    // ---- Notes ----

    pub fn add_note(&mut self, clip_id: ClipId, spec: NoteSpec) -> Option<NoteId> {
        if !spec.is_finite() {
            return None;
        }
        self.clip(clip_id)?;
        let id = self.alloc_note_id();
        let clip = self.clip_mut(clip_id)?;
        clip.notes.push(SequencerNote::new(id, spec));
        clip.touch();
        Some(id)
    }

    /// Add several notes at once. Returns the fresh ids in input order;
    /// specs with non-finite numbers are skipped.
    pub fn add_notes(&mut self, clip_id: ClipId, specs: Vec<NoteSpec>) -> Vec<NoteId> {
        if self.clip(clip_id).is_none() {
            return Vec::new();
        }
        let notes: Vec<SequencerNote> = specs
            .into_iter()
            .filter(NoteSpec::is_finite)
            .map(|spec| SequencerNote::new(self.alloc_note_id(), spec))
            .collect();
        let ids = notes.iter().map(|n| n.id).collect();
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.notes.extend(notes);
            clip.touch();
        }
        ids
    }

    pub fn note(&self, clip_id: ClipId, note_id: NoteId) -> Option<&SequencerNote> {
        self.clip(clip_id)?.note(note_id)
    }

    pub fn remove_note(&mut self, clip_id: ClipId, note_id: NoteId) -> bool {
        let Some(clip) = self.clip_mut(clip_id) else {
            return false;
        };
        let before = clip.notes.len();
        clip.notes.retain(|n| n.id != note_id);
        let removed = clip.notes.len() != before;
        if removed {
            clip.touch();
        }
        removed
    }

    /// Move a note's start. Negative times clamp to the clip origin.
    pub fn move_note(&mut self, clip_id: ClipId, note_id: NoteId, start_time: f64) -> bool {
        if !start_time.is_finite() {
            return false;
        }
        self.edit_note(clip_id, note_id, |note| note.start_time = start_time.max(0.0))
    }

    pub fn resize_note(&mut self, clip_id: ClipId, note_id: NoteId, duration: f64) -> bool {
        if !duration.is_finite() {
            return false;
        }
        self.edit_note(clip_id, note_id, |note| note.set_duration(duration))
    }

    pub fn set_note_pitch(&mut self, clip_id: ClipId, note_id: NoteId, frequency: f64, amplitude: f64) -> bool {
        if !(frequency.is_finite() && amplitude.is_finite()) {
            return false;
        }
        self.edit_note(clip_id, note_id, |note| {
            note.frequency = frequency;
            note.amplitude = amplitude;
        })
    }

    pub fn set_note_param(&mut self, clip_id: ClipId, note_id: NoteId, index: usize, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.edit_note(clip_id, note_id, |note| note.set_param(index, value))
    }

    pub fn set_note_muted(&mut self, clip_id: ClipId, note_id: NoteId, muted: bool) -> bool {
        self.edit_note(clip_id, note_id, |note| note.muted = muted)
    }

    pub fn set_note_selected(&mut self, clip_id: ClipId, note_id: NoteId, selected: bool) -> bool {
        match self.clip_mut(clip_id).and_then(|c| c.note_mut(note_id)) {
            Some(note) => {
                note.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Set the `selected` flag on every note of a clip.
    pub fn set_all_selected(&mut self, clip_id: ClipId, selected: bool) -> bool {
        match self.clip_mut(clip_id) {
            Some(clip) => {
                for note in &mut clip.notes {
                    note.selected = selected;
                }
                true
            }
            None => false,
        }
    }

    /// Remove the selected notes of a clip in one filter-and-replace and
    /// return them.
    pub fn delete_selected_notes(&mut self, clip_id: ClipId) -> Vec<SequencerNote> {
        let Some(clip) = self.clip_mut(clip_id) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut clip.notes).into_iter().partition(|n| n.selected);
        clip.notes = kept;
        if !removed.is_empty() {
            clip.touch();
        }
        removed
    }

    /// The note stream handed to the playback runtime for one clip.
    pub fn note_events(&self, clip_id: ClipId) -> Vec<NoteEvent> {
        self.clip(clip_id)
            .map(SequencerClip::note_events)
            .unwrap_or_default()
    }

    fn edit_note(&mut self, clip_id: ClipId, note_id: NoteId, f: impl FnOnce(&mut SequencerNote)) -> bool {
        let Some(clip) = self.clip_mut(clip_id) else {
            return false;
        };
        match clip.note_mut(note_id) {
            Some(note) => {
                f(note);
                clip.touch();
                true
            }
            None => false,
        }
    }

    fn alloc_note_id(&mut self) -> NoteId {
        let id = NoteId::new(self.next_note_id);
        self.next_note_id += 1;
        id
    }

    // ---- Clip automation ----

    /// Insert (or edit within tolerance) a point on a clip's parameter curve.
    /// The time is clamped into `[0, clip.duration]`.
    pub fn add_automation_point(
        &mut self,
        clip_id: ClipId,
        param_name: &str,
        time: f64,
        value: f64,
        easing: Easing,
    ) -> Option<PointId> {
        if !(time.is_finite() && value.is_finite() && easing.is_finite()) {
            return None;
        }
        self.clip(clip_id)?;
        let fresh = PointId::new(self.next_point_id);
        let clip = self.clip_mut(clip_id)?;
        let time = time.clamp(0.0, clip.duration);
        if clip.automation_for(param_name).is_none() {
            clip.automation.push(ClipAutomation::new(param_name));
        }
        let stored = clip
            .automation_for_mut(param_name)
            .map(|lane| lane.insert_point(fresh, time, value, easing))?;
        clip.touch();
        if stored == fresh {
            self.next_point_id += 1;
        }
        Some(stored)
    }

    pub fn remove_automation_point(&mut self, clip_id: ClipId, param_name: &str, point_id: PointId) -> bool {
        self.edit_automation(clip_id, param_name, |lane| lane.remove_point(point_id))
    }

    /// Move a point; its time is clamped into `[0, clip.duration]`.
    pub fn move_automation_point(
        &mut self,
        clip_id: ClipId,
        param_name: &str,
        point_id: PointId,
        time: f64,
        value: f64,
    ) -> bool {
        if !(time.is_finite() && value.is_finite()) {
            return false;
        }
        let Some(duration) = self.clip(clip_id).map(|c| c.duration) else {
            return false;
        };
        let time = time.clamp(0.0, duration);
        self.edit_automation(clip_id, param_name, |lane| lane.move_point(point_id, time, value))
    }

    pub fn set_automation_easing(
        &mut self,
        clip_id: ClipId,
        param_name: &str,
        point_id: PointId,
        easing: Easing,
    ) -> bool {
        if !easing.is_finite() {
            return false;
        }
        self.edit_automation(clip_id, param_name, |lane| lane.set_easing(point_id, easing))
    }

    /// Drop a parameter's whole automation curve from a clip.
    pub fn clear_automation(&mut self, clip_id: ClipId, param_name: &str) -> bool {
        self.edit_clip_if(clip_id, |clip| {
            let before = clip.automation.len();
            clip.automation.retain(|a| a.param_name != param_name);
            clip.automation.len() != before
        })
    }

    /// Sample a clip's parameter curve at `t` seconds from clip start.
    pub fn automation_value_at(&self, clip_id: ClipId, param_name: &str, t: f64) -> Option<f64> {
        self.clip(clip_id)?.automation_for(param_name)?.value_at(t)
    }

    fn edit_automation(
        &mut self,
        clip_id: ClipId,
        param_name: &str,
        f: impl FnOnce(&mut ClipAutomation) -> bool,
    ) -> bool {
        self.edit_clip_if(clip_id, |clip| clip.automation_for_mut(param_name).is_some_and(f))
    }

    /// Like `edit_clip`, but only marks dirty when `f` reports a change.
    fn edit_clip_if(&mut self, id: ClipId, f: impl FnOnce(&mut SequencerClip) -> bool) -> bool {
        let Some(clip) = self.clip_mut(id) else {
            return false;
        };
        let changed = f(clip);
        if changed {
            clip.touch();
        }
        changed
    }

    // ---- Environment curves ----

    /// Insert or replace a keyframe on a named environment curve, creating
    /// the curve on first use. Returns the keyframe's index.
    pub fn set_environment_key(
        &mut self,
        name: &str,
        time: f64,
        value: KeyframeValue,
        easing: Easing,
    ) -> Option<usize> {
        if !(time.is_finite() && value.is_finite() && easing.is_finite()) {
            return None;
        }
        Some(
            self.environment
                .entry(name.to_string())
                .or_default()
                .insert(time, value, easing),
        )
    }

    pub fn remove_environment_key(&mut self, name: &str, index: usize) -> bool {
        self.environment
            .get_mut(name)
            .and_then(|curve| curve.remove_at(index))
            .is_some()
    }

    pub fn remove_environment_key_at(&mut self, name: &str, time: f64) -> bool {
        self.environment
            .get_mut(name)
            .and_then(|curve| curve.remove_at_time(time))
            .is_some()
    }

    pub fn move_environment_key(&mut self, name: &str, index: usize, time: f64) -> Option<usize> {
        if !time.is_finite() {
            return None;
        }
        self.environment.get_mut(name)?.move_keyframe(index, time)
    }

    pub fn set_environment_easing(&mut self, name: &str, index: usize, easing: Easing) -> bool {
        easing.is_finite()
            && self
                .environment
                .get_mut(name)
                .is_some_and(|curve| curve.set_easing(index, easing))
    }

    pub fn remove_environment_curve(&mut self, name: &str) -> bool {
        self.environment.remove(name).is_some()
    }

    pub fn environment_value_at(&self, name: &str, t: f64) -> Option<KeyframeValue> {
        self.environment.get(name)?.value_at(t)
    }

    // ---- Load repair ----

    /// Bring id counters past every id in use. Counters never move backwards.
    pub fn recalculate_next_ids(&mut self) {
        let next = |max: Option<u32>| max.map_or(1, |m| m + 1);
        self.next_track_id = self
            .next_track_id
            .max(next(self.tracks.iter().map(|t| t.id.get()).max()));
        self.next_clip_id = self
            .next_clip_id
            .max(next(self.clips.iter().map(|c| c.id.get()).max()));
        self.next_instance_id = self
            .next_instance_id
            .max(next(self.instances.iter().map(|i| i.id.get()).max()));
        self.next_note_id = self.next_note_id.max(next(
            self.clips
                .iter()
                .flat_map(|c| c.notes.iter().map(|n| n.id.get()))
                .max(),
        ));
        self.next_point_id = self.next_point_id.max(next(
            self.clips
                .iter()
                .flat_map(|c| c.automation.iter().filter_map(|a| a.max_point_id()))
                .map(PointId::get)
                .max(),
        ));
    }

    /// Restore the structural invariants after loading untrusted data.
    /// Returns the instances that were dropped because their clip or track
    /// no longer exists.
    pub fn repair(&mut self) -> Vec<ClipInstance> {
        for clip in &mut self.clips {
            clip.duration = clip.duration.max(MIN_CLIP_DURATION);
            for note in &mut clip.notes {
                note.set_duration(note.duration);
            }
            let max = clip.duration;
            for lane in &mut clip.automation {
                lane.clamp_times(max);
            }
        }

        let clip_ids: HashSet<ClipId> = self.clips.iter().map(|c| c.id).collect();
        let track_ids: HashSet<TrackId> = self.tracks.iter().map(|t| t.id).collect();
        let (kept, orphans): (Vec<_>, Vec<_>) = std::mem::take(&mut self.instances)
            .into_iter()
            .partition(|i| clip_ids.contains(&i.clip_id) && track_ids.contains(&i.track_id));
        self.instances = kept;

        self.recalculate_next_ids();
        orphans
    }
}
