use super::Reduced;
use crate::{ArrangementState, AutomationAction, CreatedId, EnvironmentAction};

pub(super) fn reduce(action: &AutomationAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        AutomationAction::AddPoint { clip_id, param, time, value, easing } => {
            Reduced::created_or_stale(
                arr.add_automation_point(*clip_id, param, *time, *value, *easing)
                    .map(CreatedId::Point),
            )
        }
        AutomationAction::RemovePoint { clip_id, param, point_id } => {
            Reduced::from_bool(arr.remove_automation_point(*clip_id, param, *point_id))
        }
        AutomationAction::MovePoint { clip_id, param, point_id, time, value } => Reduced::from_bool(
            arr.move_automation_point(*clip_id, param, *point_id, *time, *value),
        ),
        AutomationAction::SetEasing { clip_id, param, point_id, easing } => {
            Reduced::from_bool(arr.set_automation_easing(*clip_id, param, *point_id, *easing))
        }
        AutomationAction::Clear { clip_id, param } => {
            Reduced::from_bool(arr.clear_automation(*clip_id, param))
        }
    }
}

pub(super) fn reduce_environment(action: &EnvironmentAction, arr: &mut ArrangementState) -> Reduced {
    match action {
        EnvironmentAction::SetKey { curve, time, value, easing } => Reduced::created_or_stale(
            arr.set_environment_key(curve, *time, value.clone(), *easing)
                .map(CreatedId::Keyframe),
        ),
        EnvironmentAction::RemoveKey { curve, index } => {
            Reduced::from_bool(arr.remove_environment_key(curve, *index))
        }
        EnvironmentAction::RemoveKeyAt { curve, time } => {
            Reduced::from_bool(arr.remove_environment_key_at(curve, *time))
        }
        EnvironmentAction::MoveKey { curve, index, time } => Reduced::created_or_stale(
            arr.move_environment_key(curve, *index, *time)
                .map(CreatedId::Keyframe),
        ),
        EnvironmentAction::SetEasing { curve, index, easing } => {
            Reduced::from_bool(arr.set_environment_easing(curve, *index, *easing))
        }
        EnvironmentAction::RemoveCurve(curve) => Reduced::from_bool(arr.remove_environment_curve(curve)),
    }
}
