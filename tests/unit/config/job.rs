use super::*;

fn opts() -> JobOptions {
    JobOptions {
        phrase: Some("  why are we here  ".to_owned()),
        highlights: Some(RawHighlights::Joined("why, ,here".to_owned())),
        color: Some("#ff0000".to_owned()),
        duration: Some(RawValue::from("1")),
        fps: Some(RawValue::from("20")),
        resolution: Some("640x360".to_owned()),
        grain: Some(RawValue::Number(0.1)),
        blur: Some(RawValue::from("1.5")),
        mime_candidates: None,
        seed: Some(9),
    }
}

#[test]
fn resolve_well_formed_options() {
    let job = opts().resolve(SurfaceConfig::default());
    assert_eq!(job.surface, SurfaceConfig { width: 640, height: 360 });
    assert_eq!(job.frame.phrase, "why are we here");
    assert_eq!(job.frame.highlights, vec!["why", "here"]);
    assert_eq!(job.frame.color, Rgba8::rgb(255, 0, 0));
    assert_eq!(job.frame.grain_amount, 0.1);
    assert_eq!(job.frame.blur_radius_px, 1.5);
    assert_eq!(job.video.fps.num, 20);
    assert_eq!(job.video.total_frames, 20);
    assert_eq!(job.video.canvas.width, 640);
    assert_eq!(job.seed, Some(9));
    assert_eq!(job.video.mime_candidates.len(), 3);
}

#[test]
fn malformed_numbers_fall_back_to_defaults() {
    let o = JobOptions {
        duration: Some(RawValue::from("soon")),
        fps: Some(RawValue::from("fast")),
        grain: Some(RawValue::from("")),
        blur: Some(RawValue::from("NaN")),
        color: Some("yellow".to_owned()),
        ..JobOptions::default()
    };
    let job = o.resolve(SurfaceConfig::default());
    assert_eq!(job.video.duration_secs, DEFAULT_DURATION_SECS);
    assert_eq!(job.video.fps.num, DEFAULT_FPS);
    assert_eq!(job.video.total_frames, 60);
    assert_eq!(job.frame.grain_amount, DEFAULT_GRAIN);
    assert_eq!(job.frame.blur_radius_px, DEFAULT_BLUR_PX);
    assert_eq!(job.frame.color, DEFAULT_COLOR);
}

#[test]
fn numeric_ranges_are_clamped() {
    let o = JobOptions {
        duration: Some(RawValue::Number(0.01)),
        fps: Some(RawValue::from("240")),
        grain: Some(RawValue::Number(3.0)),
        blur: Some(RawValue::Number(-2.0)),
        ..JobOptions::default()
    };
    let job = o.resolve(SurfaceConfig::default());
    assert_eq!(job.video.duration_secs, MIN_DURATION_SECS);
    assert_eq!(job.video.fps.num, MAX_FPS);
    assert_eq!(job.frame.grain_amount, 1.0);
    assert_eq!(job.frame.blur_radius_px, 0.0);

    let slow = JobOptions {
        fps: Some(RawValue::from("2")),
        ..JobOptions::default()
    };
    assert_eq!(slow.resolve(SurfaceConfig::default()).video.fps.num, MIN_FPS);
}

#[test]
fn fractional_fps_truncates() {
    let o = JobOptions {
        fps: Some(RawValue::from("29.97")),
        ..JobOptions::default()
    };
    assert_eq!(o.resolve(SurfaceConfig::default()).video.fps.num, 29);
}

#[test]
fn text_numbers_read_their_leading_prefix() {
    let o = JobOptions {
        duration: Some(RawValue::from(" 2.5s")),
        fps: Some(RawValue::from("45fps")),
        grain: Some(RawValue::from(".1 lots")),
        blur: Some(RawValue::from("1e0px")),
        ..JobOptions::default()
    };
    let job = o.resolve(SurfaceConfig::default());
    assert_eq!(job.video.duration_secs, 2.5);
    assert_eq!(job.video.fps.num, 45);
    assert_eq!(job.frame.grain_amount, 0.1);
    assert_eq!(job.frame.blur_radius_px, 1.0);

    // Whole-number fields stop at the first non-digit.
    let o = JobOptions {
        fps: Some(RawValue::from("3e1")),
        ..JobOptions::default()
    };
    assert_eq!(o.resolve(SurfaceConfig::default()).video.fps.num, MIN_FPS);
}

#[test]
fn numeric_prefix_parsers() {
    assert_eq!(float_prefix("2s"), Some(2.0));
    assert_eq!(float_prefix("-0.5x"), Some(-0.5));
    assert_eq!(float_prefix("5."), Some(5.0));
    assert_eq!(float_prefix("1e"), Some(1.0));
    assert_eq!(float_prefix("."), None);
    assert_eq!(float_prefix("-"), None);
    assert_eq!(float_prefix("NaN"), None);
    assert_eq!(int_prefix("  45fps"), Some(45.0));
    assert_eq!(int_prefix("29.97"), Some(29.0));
    assert_eq!(int_prefix("+7"), Some(7.0));
    assert_eq!(int_prefix("fps"), None);
}

#[test]
fn unparsable_resolution_keeps_prior() {
    let prior = SurfaceConfig {
        width: 800,
        height: 600,
    };
    let o = JobOptions {
        resolution: Some("big".to_owned()),
        ..JobOptions::default()
    };
    assert_eq!(o.resolve(prior).surface, prior);
    assert_eq!(o.resolve(prior).video.canvas.width, 800);
}

#[test]
fn total_frames_rounds_and_never_hits_zero() {
    let c = Canvas {
        width: 64,
        height: 64,
    };
    assert_eq!(VideoJobConfig::new(c, 30, 2.0).unwrap().total_frames, 60);
    assert_eq!(VideoJobConfig::new(c, 10, 0.1).unwrap().total_frames, 1);
    assert_eq!(VideoJobConfig::new(c, 30, 2.0).unwrap().duration_ms(), 2000);
    assert!(VideoJobConfig::new(c, 9, 1.0).is_err());
    assert!(VideoJobConfig::new(c, 30, 0.05).is_err());
}

#[test]
fn highlights_split_on_commas() {
    assert_eq!(split_highlights(" a ,b,, c "), vec!["a", "b", "c"]);
    assert!(split_highlights(" , ").is_empty());
    let list = RawHighlights::List(vec!["why".to_owned(), " here ".to_owned()]);
    assert_eq!(list.targets(), vec!["why", "here"]);
}

#[test]
fn json_job_file_accepts_strings_and_numbers() {
    let o = JobOptions::from_json_str(
        r#"{"phrase":"Meaning of Life","highlights":["meaning"],"fps":24,"duration":"1.5"}"#,
    )
    .unwrap();
    assert_eq!(o.fps, Some(RawValue::Number(24.0)));
    let job = o.resolve(SurfaceConfig::default());
    assert_eq!(job.video.total_frames, 36);
    assert!(JobOptions::from_json_str(r##"{"colour":"#fff"}"##).is_err());
}

#[test]
fn merge_prefers_overrides() {
    let base = opts();
    let over = JobOptions {
        phrase: Some("other".to_owned()),
        ..JobOptions::default()
    };
    let merged = base.clone().merged_with(over);
    assert_eq!(merged.phrase.as_deref(), Some("other"));
    assert_eq!(merged.resolution, base.resolution);
}
