use super::*;

fn arr_with_clip(duration: f64) -> (ArrangementState, ClipId, TrackId) {
    let mut arr = ArrangementState::new();
    let track = arr.add_track("Lead".to_string(), "saw".to_string());
    let clip = arr.add_clip("Riff".to_string(), "saw".to_string(), duration);
    (arr, clip, track)
}

#[test]
fn test_add_remove_clip() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    assert_eq!(arr.clip(cid).unwrap().name, "Riff");
    assert!(arr.remove_clip(cid));
    assert!(arr.clip(cid).is_none());
    assert!(!arr.remove_clip(cid));
}

#[test]
fn test_remove_clip_cascades_to_instances() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    let other = arr.add_clip("Other".to_string(), "saw".to_string(), 2.0);
    arr.add_instance(cid, tid, 0.0);
    arr.add_instance(cid, tid, 4.0);
    arr.add_instance(other, tid, 8.0);

    arr.remove_clip(cid);
    assert_eq!(arr.instances.len(), 1);
    assert_eq!(arr.instances[0].clip_id, other);
}

#[test]
fn test_remove_track_cascades_to_instances() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    let t2 = arr.add_track("Bass".to_string(), "sub".to_string());
    arr.add_instance(cid, tid, 0.0);
    arr.add_instance(cid, t2, 0.0);

    assert!(arr.remove_track(tid));
    assert_eq!(arr.instances.len(), 1);
    assert_eq!(arr.instances[0].track_id, t2);
    assert!(arr.clip(cid).is_some());
}

#[test]
fn test_add_instance_requires_live_refs() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    assert!(arr.add_instance(ClipId::new(99), tid, 0.0).is_none());
    assert!(arr.add_instance(cid, TrackId::new(99), 0.0).is_none());
    let iid = arr.add_instance(cid, tid, -2.0).unwrap();
    assert_eq!(arr.instance(iid).unwrap().start_time, 0.0);
}

#[test]
fn test_ensure_track_is_idempotent() {
    let mut arr = ArrangementState::new();
    let id = arr.ensure_track(2);
    assert_eq!(arr.tracks.len(), 3);
    assert_eq!(arr.ensure_track(2), id);
    assert_eq!(arr.ensure_track(0), arr.tracks[0].id);
    assert_eq!(arr.tracks.len(), 3);
    assert_eq!(arr.tracks[1].name, "Track 2");
}

#[test]
fn test_ensure_synth_track_reuses_existing() {
    let mut arr = ArrangementState::new();
    let a = arr.ensure_synth_track("fm");
    let b = arr.ensure_synth_track("granular");
    assert_ne!(a, b);
    assert_eq!(arr.ensure_synth_track("fm"), a);
    assert_eq!(arr.tracks.len(), 2);
}

#[test]
fn test_track_colors_cycle_palette() {
    let mut arr = ArrangementState::new();
    for i in 0..=TRACK_COUNT_PAST_PALETTE {
        arr.add_track(format!("T{i}"), String::new());
    }
    assert_eq!(arr.tracks[0].color, palette_color(0));
    assert_eq!(arr.tracks[1].color, palette_color(1));
    assert_eq!(arr.tracks[TRACK_COUNT_PAST_PALETTE].color, arr.tracks[0].color);
}

const TRACK_COUNT_PAST_PALETTE: usize = crate::state::track::TRACK_PALETTE.len();

#[test]
fn test_move_track_keeps_instances_attached() {
    let (mut arr, cid, t1) = arr_with_clip(4.0);
    let t2 = arr.add_track("Pad".to_string(), "pad".to_string());
    let iid = arr.add_instance(cid, t1, 0.0).unwrap();

    assert!(arr.move_track(t1, 5));
    assert_eq!(arr.track_index(t1), Some(1));
    assert_eq!(arr.track_index(t2), Some(0));
    assert_eq!(arr.instance(iid).unwrap().track_id, t1);
}

#[test]
fn test_move_instance_to_missing_track_is_noop() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    let iid = arr.add_instance(cid, tid, 1.0).unwrap();
    assert!(!arr.move_instance(iid, Some(TrackId::new(42)), 3.0));
    assert_eq!(arr.instance(iid).unwrap().start_time, 1.0);
    assert!(arr.move_instance(iid, None, 3.0));
    assert_eq!(arr.instance(iid).unwrap().start_time, 3.0);
}

#[test]
fn test_duration_is_latest_instance_end() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    assert_eq!(arr.duration(), 0.0);
    arr.add_instance(cid, tid, 0.0);
    arr.add_instance(cid, tid, 10.0);
    assert_eq!(arr.duration(), 14.0);
}

#[test]
fn test_instance_at() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    arr.add_instance(cid, tid, 2.0);
    assert!(arr.instance_at(tid, 1.0).is_none());
    assert!(arr.instance_at(tid, 2.0).is_some());
    assert!(arr.instance_at(tid, 5.9).is_some());
    assert!(arr.instance_at(tid, 6.0).is_none());
}

#[test]
fn test_instances_on_track_sorted() {
    let (mut arr, cid, tid) = arr_with_clip(1.0);
    arr.add_instance(cid, tid, 8.0);
    arr.add_instance(cid, tid, 2.0);
    arr.add_instance(cid, tid, 5.0);
    let starts: Vec<f64> = arr.instances_on_track(tid).iter().map(|i| i.start_time).collect();
    assert_eq!(starts, vec![2.0, 5.0, 8.0]);
}

#[test]
fn test_delete_instances_filters_in_one_pass() {
    let (mut arr, cid, tid) = arr_with_clip(1.0);
    let a = arr.add_instance(cid, tid, 0.0).unwrap();
    let b = arr.add_instance(cid, tid, 1.0).unwrap();
    let c = arr.add_instance(cid, tid, 2.0).unwrap();
    let ids: BTreeSet<InstanceId> = [a, c].into_iter().collect();
    assert_eq!(arr.delete_instances(&ids), 2);
    assert_eq!(arr.instances.len(), 1);
    assert_eq!(arr.instances[0].id, b);
}

#[test]
fn test_note_duration_floor_on_every_edit() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    let nid = arr.add_note(cid, NoteSpec::new(0.0, 0.0)).unwrap();
    assert_eq!(arr.note(cid, nid).unwrap().duration, 0.1);
    arr.resize_note(cid, nid, 0.05);
    assert_eq!(arr.note(cid, nid).unwrap().duration, 0.1);
    arr.resize_note(cid, nid, 1.5);
    assert_eq!(arr.note(cid, nid).unwrap().duration, 1.5);
}

#[test]
fn test_note_ops_on_missing_ids_are_noops() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    assert!(arr.add_note(ClipId::new(77), NoteSpec::default()).is_none());
    assert!(!arr.move_note(cid, NoteId::new(77), 1.0));
    assert!(!arr.remove_note(cid, NoteId::new(77)));
    assert!(!arr.resize_note(ClipId::new(77), NoteId::new(1), 1.0));
    assert!(arr.note_events(ClipId::new(77)).is_empty());
}

#[test]
fn test_note_ids_unique_across_clips() {
    let (mut arr, c1, _) = arr_with_clip(4.0);
    let c2 = arr.add_clip("B".to_string(), "saw".to_string(), 4.0);
    let a = arr.add_note(c1, NoteSpec::default()).unwrap();
    let b = arr.add_note(c2, NoteSpec::default()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_mutations_mark_clip_dirty() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    assert!(arr.mark_clean(cid));
    assert_eq!(arr.dirty_clips().count(), 0);

    let nid = arr.add_note(cid, NoteSpec::default()).unwrap();
    assert!(arr.clip(cid).unwrap().is_dirty);

    arr.mark_clean(cid);
    arr.move_note(cid, nid, 1.0);
    assert!(arr.clip(cid).unwrap().is_dirty);

    arr.mark_clean(cid);
    arr.add_automation_point(cid, "cutoff", 0.0, 100.0, Easing::Linear);
    assert_eq!(arr.dirty_clips().count(), 1);

    arr.mark_clean(cid);
    assert!(arr.set_clip_file_path(cid, Some("riff.json".into())));
    assert!(arr.clip(cid).unwrap().is_dirty);

    arr.set_clip_param_names(cid, vec!["cutoff".to_string()]);
    arr.mark_clean(cid);
    assert!(arr.set_clip_lane_range(cid, 0, 900.0, 100.0));
    assert!(arr.clip(cid).unwrap().is_dirty);
    let lane = &arr.clip(cid).unwrap().parameter_lanes[0];
    assert_eq!((lane.min, lane.max), (100.0, 900.0));

    arr.mark_clean(cid);
    assert!(arr.set_clip_lane_collapsed(cid, 0, true));
    assert!(arr.clip(cid).unwrap().is_dirty);

    // A lane that does not exist changes nothing
    arr.mark_clean(cid);
    assert!(!arr.set_clip_lane_collapsed(cid, 7, true));
    assert!(!arr.clip(cid).unwrap().is_dirty);
}

#[test]
fn test_non_finite_writes_are_refused() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    let nid = arr.add_note(cid, NoteSpec::new(1.0, 0.5)).unwrap();
    let before = arr.clone();

    assert!(arr.add_note(cid, NoteSpec::new(f64::NAN, 0.5)).is_none());
    assert!(arr.add_notes(cid, vec![NoteSpec::new(0.0, f64::INFINITY)]).is_empty());
    assert!(!arr.move_note(cid, nid, f64::INFINITY));
    assert!(!arr.resize_note(cid, nid, f64::NAN));
    assert!(!arr.set_note_pitch(cid, nid, f64::INFINITY, 0.5));
    assert!(!arr.set_note_param(cid, nid, 0, f64::NAN));
    assert!(!arr.set_clip_duration(cid, f64::INFINITY));
    assert!(arr.add_instance(cid, tid, f64::INFINITY).is_none());
    assert!(arr
        .add_automation_point(cid, "gain", 1.0, f64::NAN, Easing::Linear)
        .is_none());
    let bad_curve = Easing::Bezier(crate::CubicBezier::new(0.2, f64::NAN, 0.8, 1.0));
    assert!(arr
        .add_automation_point(cid, "gain", 1.0, 0.5, bad_curve)
        .is_none());
    assert!(arr
        .set_environment_key("zoom", f64::INFINITY, KeyframeValue::Number(1.0), Easing::Linear)
        .is_none());
    assert!(arr
        .set_environment_key("zoom", 0.0, KeyframeValue::Vector(vec![f64::NAN]), Easing::Linear)
        .is_none());
    assert!(!arr.set_clip_lane_range(cid, 0, f64::NEG_INFINITY, 1.0));

    assert_eq!(arr, before);
}

#[test]
fn test_delete_selected_notes() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    let ids = arr.add_notes(
        cid,
        vec![NoteSpec::new(0.0, 1.0), NoteSpec::new(1.0, 1.0), NoteSpec::new(2.0, 1.0)],
    );
    arr.set_note_selected(cid, ids[0], true);
    arr.set_note_selected(cid, ids[2], true);

    let removed = arr.delete_selected_notes(cid);
    assert_eq!(removed.len(), 2);
    let clip = arr.clip(cid).unwrap();
    assert_eq!(clip.notes.len(), 1);
    assert_eq!(clip.notes[0].id, ids[1]);
}

#[test]
fn test_automation_times_clamped_to_clip() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    let p = arr
        .add_automation_point(cid, "cutoff", 9.0, 500.0, Easing::Linear)
        .unwrap();
    let lane = arr.clip(cid).unwrap().automation_for("cutoff").unwrap();
    assert_eq!(lane.point(p).unwrap().time, 4.0);

    assert!(arr.move_automation_point(cid, "cutoff", p, -3.0, 200.0));
    let lane = arr.clip(cid).unwrap().automation_for("cutoff").unwrap();
    assert_eq!(lane.point(p).unwrap().time, 0.0);
    assert_eq!(lane.point(p).unwrap().value, 200.0);
}

#[test]
fn test_shrinking_clip_pulls_automation_in() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    arr.add_automation_point(cid, "pan", 3.5, 1.0, Easing::Linear);
    arr.set_clip_duration(cid, 2.0);
    let lane = arr.clip(cid).unwrap().automation_for("pan").unwrap();
    assert_eq!(lane.points()[0].time, 2.0);
}

#[test]
fn test_shrinking_clip_merges_points_at_the_end() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    arr.add_automation_point(cid, "pan", 0.5, 0.0, Easing::Linear);
    arr.add_automation_point(cid, "pan", 3.0, 0.4, Easing::Linear);
    let last = arr
        .add_automation_point(cid, "pan", 3.5, 1.0, Easing::Linear)
        .unwrap();
    arr.set_clip_duration(cid, 2.0);

    let lane = arr.clip(cid).unwrap().automation_for("pan").unwrap();
    let times: Vec<f64> = lane.points().iter().map(|p| p.time).collect();
    assert_eq!(times, vec![0.5, 2.0]);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(lane.points()[1].id, last);
    assert_eq!(lane.points()[1].value, 1.0);
}

#[test]
fn test_automation_value_at_lane_scenario() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    arr.add_automation_point(cid, "mix", 4.0, 0.1, Easing::Linear);
    arr.add_automation_point(cid, "mix", 0.0, 0.2, Easing::Linear);
    arr.add_automation_point(cid, "mix", 2.0, 0.8, Easing::Linear);

    let at = |t| arr.automation_value_at(cid, "mix", t).unwrap();
    assert!((at(1.0) - 0.5).abs() < 1e-9);
    assert!((at(-1.0) - 0.2).abs() < 1e-9);
    assert!((at(10.0) - 0.1).abs() < 1e-9);
    assert!(arr.automation_value_at(cid, "missing", 1.0).is_none());
}

#[test]
fn test_automation_near_duplicate_keeps_point_id() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    let a = arr.add_automation_point(cid, "gain", 1.0, 0.1, Easing::Linear).unwrap();
    let b = arr.add_automation_point(cid, "gain", 1.0005, 0.9, Easing::Linear).unwrap();
    assert_eq!(a, b);
    let c = arr.add_automation_point(cid, "gain", 2.0, 0.9, Easing::Linear).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_clear_automation() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    arr.add_automation_point(cid, "gain", 1.0, 0.1, Easing::Linear);
    assert!(arr.clear_automation(cid, "gain"));
    assert!(!arr.clear_automation(cid, "gain"));
    assert!(arr.clip(cid).unwrap().automation.is_empty());
}

#[test]
fn test_set_clip_param_names_rebuilds_lanes() {
    let (mut arr, cid, _) = arr_with_clip(4.0);
    arr.set_clip_param_names(cid, vec!["cutoff".to_string(), "gain".to_string()]);
    {
        let clip = arr.clip_mut(cid).unwrap();
        clip.parameter_lanes[0].min = 100.0;
        clip.parameter_lanes[0].collapsed = true;
    }
    arr.set_clip_param_names(cid, vec!["pan".to_string(), "cutoff".to_string()]);
    let lanes = &arr.clip(cid).unwrap().parameter_lanes;
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[1].param_name, "cutoff");
    assert_eq!(lanes[1].param_index, 1);
    assert_eq!(lanes[1].min, 100.0);
    assert!(lanes[1].collapsed);
    assert_eq!(lanes[0].min, -1.0);
}

#[test]
fn test_track_automation_lanes_rebuild() {
    let (mut arr, _, tid) = arr_with_clip(4.0);
    assert!(arr.rebuild_automation_lanes(tid, &["cutoff".to_string()]));
    assert!(!arr.rebuild_automation_lanes(TrackId::new(9), &["cutoff".to_string()]));
    assert_eq!(arr.track(tid).unwrap().automation_lanes.len(), 1);
}

#[test]
fn test_environment_curves() {
    let mut arr = ArrangementState::new();
    arr.set_environment_key("camera.zoom", 0.0, KeyframeValue::Number(1.0), Easing::Linear);
    arr.set_environment_key("camera.zoom", 2.0, KeyframeValue::Number(3.0), Easing::Linear);

    assert_eq!(
        arr.environment_value_at("camera.zoom", 1.0),
        Some(KeyframeValue::Number(2.0))
    );
    assert!(arr.environment_value_at("missing", 1.0).is_none());

    assert_eq!(arr.move_environment_key("camera.zoom", 0, 3.0), Some(1));
    assert_eq!(arr.environment["camera.zoom"].keyframes()[0].time, 2.0);
    assert!(arr.remove_environment_key_at("camera.zoom", 3.0));
    assert!(!arr.remove_environment_key("camera.zoom", 5));
    assert!(arr.remove_environment_curve("camera.zoom"));
    assert!(arr.environment.is_empty());
}

#[test]
fn test_recalculate_next_ids_never_reuses() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    arr.add_instance(cid, tid, 0.0);
    arr.add_note(cid, NoteSpec::default());
    arr.next_clip_id = 0;
    arr.next_note_id = 0;
    arr.recalculate_next_ids();
    assert_eq!(arr.next_clip_id, cid.get() + 1);
    assert_eq!(arr.next_note_id, 2);

    let fresh = arr.add_clip("New".to_string(), String::new(), 1.0);
    assert_ne!(fresh, cid);
}

#[test]
fn test_repair_drops_orphans_and_clamps() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    arr.add_instance(cid, tid, 0.0);
    arr.instances.push(ClipInstance {
        id: InstanceId::new(50),
        clip_id: ClipId::new(999),
        track_id: tid,
        start_time: 0.0,
    });
    arr.clip_mut(cid).unwrap().notes.push(SequencerNote {
        duration: 0.0,
        ..SequencerNote::new(NoteId::new(40), NoteSpec::default())
    });

    let orphans = arr.repair();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, InstanceId::new(50));
    assert_eq!(arr.instances.len(), 1);
    assert_eq!(arr.clip(cid).unwrap().notes[0].duration, 0.1);
    assert_eq!(arr.next_note_id, 41);
    assert_eq!(arr.next_instance_id, 2);
}

#[test]
fn test_serde_round_trip() {
    let (mut arr, cid, tid) = arr_with_clip(4.0);
    arr.add_note(cid, NoteSpec::new(1.0, 0.5).with_params(vec![0.3, 0.7]));
    arr.add_automation_point(cid, "cutoff", 1.0, 800.0, Easing::EaseInOut);
    arr.add_instance(cid, tid, 2.0);
    arr.set_environment_key("fog", 0.0, KeyframeValue::Vector(vec![0.1, 0.2]), Easing::Bounce);

    let json = serde_json::to_string(&arr).unwrap();
    let back: ArrangementState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, arr);
}
