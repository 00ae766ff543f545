// Unit tests for domain models

use std::sync::{Arc, Mutex};

use super::*;

fn assert_invariant(range: &TrimRange) {
    assert!(range.start_ms() <= range.end_ms(), "{:?}", range);
    assert!(range.end_ms() <= range.max_ms(), "{:?}", range);
}

#[test]
fn test_trim_full_range() {
    let range = TrimRange::full(125_000);
    assert_eq!(range.start_ms(), 0);
    assert_eq!(range.end_ms(), 125_000);
    assert_eq!(range.selected_duration_ms(), 125_000);
}

#[test]
fn test_trim_new_rejects_inverted_range() {
    assert!(TrimRange::new(5_000, 1_000, 10_000).is_err());
    assert!(TrimRange::new(0, 11_000, 10_000).is_err());
    assert!(TrimRange::new(1_000, 1_000, 10_000).is_ok());
}

#[test]
fn test_set_start_past_end_is_rejected() {
    let mut range = TrimRange::new(1_000, 5_000, 10_000).unwrap();
    assert!(!range.set_start(6_000));
    assert_eq!(range, TrimRange::new(1_000, 5_000, 10_000).unwrap());

    assert!(range.set_start(5_000));
    assert_eq!(range.start_ms(), 5_000);
    assert_eq!(range.selected_duration_ms(), 0);

    // End sitting at the maximum
    let mut range = TrimRange::full(10_000);
    assert!(!range.set_start(20_000));
    assert!(!range.set_start(u64::MAX));
    assert_eq!(range, TrimRange::full(10_000));
}

#[test]
fn test_trim_deserialize_checks_invariant() {
    let range: TrimRange =
        serde_json::from_str(r#"{"start_ms":1000,"end_ms":5000,"max_ms":10000}"#).unwrap();
    assert_eq!(range, TrimRange::new(1_000, 5_000, 10_000).unwrap());

    assert!(serde_json::from_str::<TrimRange>(r#"{"start_ms":6000,"end_ms":5000,"max_ms":10000}"#).is_err());
    assert!(serde_json::from_str::<TrimRange>(r#"{"start_ms":0,"end_ms":11000,"max_ms":10000}"#).is_err());
}

#[test]
fn test_set_end_below_start_clamps_to_start() {
    let mut range = TrimRange::new(4_000, 8_000, 10_000).unwrap();
    assert_eq!(range.set_end(1_000), 4_000);
    assert_eq!(range.end_ms(), 4_000);
    assert_eq!(range.set_end(u64::MAX), 10_000);
}

#[test]
fn test_trim_invariant_under_adversarial_setters() {
    let mut range = TrimRange::full(9_000);
    let inputs = [0, 9_001, u64::MAX, 4_500, 1, 8_999, 0, 3_000, u64::MAX / 2, 7];
    for (i, value) in inputs.iter().enumerate() {
        if i % 2 == 0 {
            range.set_start(*value);
        } else {
            range.set_end(*value);
        }
        assert_invariant(&range);
        range.nudge_start(if i % 3 == 0 { -100 } else { 100 });
        assert_invariant(&range);
        range.nudge_end(if i % 3 == 0 { 100 } else { -100 });
        assert_invariant(&range);
    }
}

#[test]
fn test_nudges_ignore_out_of_bounds_steps() {
    let mut range = TrimRange::new(0, 1_000, 1_000).unwrap();
    assert!(!range.nudge_start(-100));
    assert!(!range.nudge_end(100));
    assert!(range.nudge_start(100));
    assert!(range.nudge_end(-100));
    assert_eq!((range.start_ms(), range.end_ms()), (100, 900));

    let mut pinched = TrimRange::new(500, 500, 1_000).unwrap();
    assert!(!pinched.nudge_start(100));
    assert!(!pinched.nudge_end(-100));
}

#[test]
fn test_rotation_is_a_four_cycle() {
    let ring: Vec<Rotation> = std::iter::successors(Some(Rotation::None), |r| Some(r.next()))
        .take(5)
        .collect();
    assert_eq!(
        ring,
        vec![
            Rotation::None,
            Rotation::Cw90,
            Rotation::Half,
            Rotation::Ccw90,
            Rotation::None
        ]
    );
    for start in [Rotation::Cw90, Rotation::Ccw90, Rotation::Half] {
        assert_eq!(start.next().next().next().next(), start);
    }
}

#[test]
fn test_scale_left_right_is_identity() {
    for scale in [Scale::P144, Scale::P360, Scale::P720] {
        assert_eq!(scale.left().right(), scale);
        assert_eq!(scale.right().left(), scale);
    }
}

#[test]
fn test_scale_ladder_wraps() {
    assert_eq!(Scale::Native.right(), Scale::P144);
    assert_eq!(Scale::P1080.right(), Scale::Native);
    assert_eq!(Scale::Native.left(), Scale::P1080);
    assert_eq!(Scale::from_pixels(720), Some(Scale::P720));
    assert_eq!(Scale::from_pixels(721), None);
    assert_eq!(Scale::P360.to_string(), "360p");
}

#[test]
fn test_rotation_degrees() {
    assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Ccw90));
    assert_eq!(Rotation::from_degrees(45), None);
    assert_eq!(Rotation::Half.degrees(), Some(180));
    assert!(Rotation::Cw90.transposes());
    assert!(!Rotation::Half.transposes());
}

#[test]
fn test_transform_uses_filter() {
    assert!(!TransformSpec::default().uses_filter());
    assert!(TransformSpec::new(Rotation::Half, Scale::Native).uses_filter());
    assert!(TransformSpec::new(Rotation::None, Scale::P144).uses_filter());
}

#[test]
fn test_asset_filename_defaults() {
    let asset = VideoAsset::new("/tmp/a.mp4", None, 1_000);
    assert_eq!(asset.filename, "videoToSplit");
    let asset = VideoAsset::from_path("/videos/holiday.mov", 1_000);
    assert_eq!(asset.filename, "holiday.mov");
    assert_eq!(asset.stem(), "holiday");
}

#[derive(Default)]
struct RecordedPreview {
    events: Arc<Mutex<Vec<String>>>,
}

impl PreviewHooks for RecordedPreview {
    fn play_from(&mut self, position_ms: u64) {
        self.events.lock().unwrap().push(format!("play {}", position_ms));
    }

    fn pause_at(&mut self, position_ms: u64) {
        self.events.lock().unwrap().push(format!("pause {}", position_ms));
    }

    fn boundary_reached(&mut self, restart_ms: u64) {
        self.events.lock().unwrap().push(format!("loop {}", restart_ms));
    }
}

#[test]
fn test_session_reports_trim_edits_to_preview() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let preview = RecordedPreview {
        events: Arc::clone(&events),
    };
    let mut session = EditSession::with_hooks(Box::new(preview));
    session.load_asset(VideoAsset::new("/v.mp4", Some("v.mp4".into()), 60_000));

    assert!(session.set_start(10_000));
    assert_eq!(session.set_end(20_000), 20_000);
    assert!(!session.set_start(30_000));
    assert!(!session.on_playback_position(19_999));
    assert!(session.on_playback_position(20_000));

    assert_eq!(
        *events.lock().unwrap(),
        vec!["play 10000", "pause 20000", "loop 10000"]
    );
}

#[test]
fn test_ignored_nudge_leaves_preview_alone() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let preview = RecordedPreview {
        events: Arc::clone(&events),
    };
    let mut session = EditSession::with_hooks(Box::new(preview));
    session.load_asset(VideoAsset::new("/v.mp4", None, 60_000));

    assert!(!session.nudge_start(false));
    assert!(!session.nudge_end(true));
    assert!(events.lock().unwrap().is_empty());

    assert!(session.nudge_start(true));
    assert!(session.nudge_end(false));
    assert_eq!(*events.lock().unwrap(), vec!["pause 100", "pause 59900"]);
}

#[test]
fn test_session_load_asset_resets_trim() {
    let mut session = EditSession::new();
    session.load_asset(VideoAsset::new("/a.mp4", None, 10_000));
    session.set_start(2_000);
    session.load_asset(VideoAsset::new("/b.mp4", None, 40_000));
    assert_eq!(*session.trim(), TrimRange::full(40_000));
    assert_eq!(session.selected_duration_label(), "00:00:40");
}

#[test]
fn test_session_toggles() {
    let mut session = EditSession::new();
    assert_eq!(session.toggle_rotation(), Rotation::Cw90);
    assert_eq!(session.scale_right(), Scale::P144);
    assert_eq!(session.scale_left(), Scale::Native);
    assert_eq!(session.scale_left(), Scale::P1080);
    assert_eq!(
        *session.transform(),
        TransformSpec::new(Rotation::Cw90, Scale::P1080)
    );
}

#[test]
fn test_segment_length_input_falls_back_on_commit() {
    let mut session = EditSession::new();
    session.load_asset(VideoAsset::new("/a.mp4", None, 10_000));

    session.set_segment_length_input("");
    assert_eq!(session.segment_length_ms(), None);
    assert!(session.split_request().unwrap_err().is_configuration());
    assert_eq!(session.commit_segment_length(), 30_000);

    session.set_segment_length_input(" 15 ");
    assert_eq!(session.commit_segment_length(), 15_000);

    session.set_segment_length_secs(f64::NAN);
    assert_eq!(session.segment_length_ms(), None);
}

#[test]
fn test_split_request_requires_asset() {
    let session = EditSession::new();
    let err = session.split_request().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_split_request_rejects_zero_length() {
    let asset = VideoAsset::new("/a.mp4", None, 10_000);
    let result = SplitRequest::new(asset, TrimRange::full(10_000), TransformSpec::default(), 0);
    assert!(result.unwrap_err().is_configuration());
}
