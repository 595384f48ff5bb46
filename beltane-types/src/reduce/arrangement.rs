use super::Reduced;
use crate::state::automation::{set_lane_collapsed, set_lane_range};
use crate::{ArrangementState, ClipAction, CreatedId, InstanceAction, TrackAction};

pub(super) fn reduce_track(action: &TrackAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        TrackAction::Add { name, synth_name } => {
            Reduced::Created(CreatedId::Track(arr.add_track(name.clone(), synth_name.clone())))
        }
        TrackAction::Ensure(index) => Reduced::Created(CreatedId::Track(arr.ensure_track(*index))),
        TrackAction::EnsureSynth(synth_name) => {
            Reduced::Created(CreatedId::Track(arr.ensure_synth_track(synth_name)))
        }
        TrackAction::Remove(id) => Reduced::from_bool(arr.remove_track(*id)),
        TrackAction::Move(id, index) => Reduced::from_bool(arr.move_track(*id, *index)),
        TrackAction::RebuildLanes(id, names) => {
            Reduced::from_bool(arr.rebuild_automation_lanes(*id, names))
        }
        TrackAction::SetLaneCollapsed(id, param_index, collapsed) => Reduced::from_bool(
            arr.track_mut(*id)
                .is_some_and(|t| set_lane_collapsed(&mut t.automation_lanes, *param_index, *collapsed)),
        ),
        TrackAction::SetLaneRange(id, param_index, min, max) => Reduced::from_bool(
            arr.track_mut(*id)
                .is_some_and(|t| set_lane_range(&mut t.automation_lanes, *param_index, *min, *max)),
        ),
        TrackAction::Rename(id, _)
        | TrackAction::SetColor(id, _)
        | TrackAction::SetMuted(id, _)
        | TrackAction::SetSolo(id, _)
        | TrackAction::SetExpanded(id, _)
        | TrackAction::SetVisible(id, _)
        | TrackAction::SetCategory(id, _) => {
            let Some(track) = arr.track_mut(*id) else {
                return Reduced::Stale;
            };
            match action {
                TrackAction::Rename(_, name) => track.name = name.clone(),
                TrackAction::SetColor(_, color) => track.color = color.clone(),
                TrackAction::SetMuted(_, muted) => track.muted = *muted,
                TrackAction::SetSolo(_, solo) => track.solo = *solo,
                TrackAction::SetExpanded(_, expanded) => track.expanded = *expanded,
                TrackAction::SetVisible(_, visible) => track.visible = *visible,
                TrackAction::SetCategory(_, category) => track.category = category.clone(),
                _ => {}
            }
            Reduced::Changed
        }
    }
}

pub(super) fn reduce_clip(action: &ClipAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        ClipAction::Create { name, synth_name, duration } => Reduced::Created(CreatedId::Clip(
            arr.add_clip(name.clone(), synth_name.clone(), *duration),
        )),
        ClipAction::Delete(id) => Reduced::from_bool(arr.remove_clip(*id)),
        ClipAction::Rename(id, name) => Reduced::from_bool(arr.rename_clip(*id, name.clone())),
        ClipAction::SetDuration(id, duration) => {
            Reduced::from_bool(arr.set_clip_duration(*id, *duration))
        }
        ClipAction::SetParamNames(id, names) => {
            Reduced::from_bool(arr.set_clip_param_names(*id, names.clone()))
        }
        ClipAction::SetFilePath(id, path) => {
            Reduced::from_bool(arr.set_clip_file_path(*id, path.clone()))
        }
        ClipAction::SetLaneCollapsed(id, param_index, collapsed) => {
            Reduced::from_bool(arr.set_clip_lane_collapsed(*id, *param_index, *collapsed))
        }
        ClipAction::SetLaneRange(id, param_index, min, max) => {
            Reduced::from_bool(arr.set_clip_lane_range(*id, *param_index, *min, *max))
        }
        ClipAction::MarkClean(id) => Reduced::from_bool(arr.mark_clean(*id)),
    }
}

pub(super) fn reduce_instance(action: &InstanceAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        InstanceAction::Place { clip_id, track_id, start_time } => Reduced::created_or_stale(
            arr.add_instance(*clip_id, *track_id, *start_time)
                .map(CreatedId::Instance),
        ),
        InstanceAction::Remove(id) => Reduced::from_bool(arr.remove_instance(*id)),
        InstanceAction::Move { instance_id, track_id, start_time } => {
            Reduced::from_bool(arr.move_instance(*instance_id, *track_id, *start_time))
        }
    }
}
