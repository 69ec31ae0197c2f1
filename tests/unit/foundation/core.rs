use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_round_frames() {
    let fps = Fps::whole(30).unwrap();
    assert_eq!(fps.secs_to_frames_round(2.0), 60);
    assert_eq!(Fps::whole(10).unwrap().secs_to_frames_round(0.1), 1);
    assert_eq!(Fps::whole(24).unwrap().secs_to_frames_round(1.03), 25);
}

#[test]
fn fps_frame_interval_is_one_over_fps() {
    let fps = Fps::whole(20).unwrap();
    assert_eq!(fps.frame_interval().as_millis(), 50);
}

#[test]
fn hex_parsing_accepts_both_lengths() {
    assert_eq!(Rgba8::from_hex("#ffe14d").unwrap(), Rgba8::rgb(0xff, 0xe1, 0x4d));
    assert_eq!(
        Rgba8::from_hex("FFE14D80").unwrap(),
        Rgba8 {
            r: 0xff,
            g: 0xe1,
            b: 0x4d,
            a: 0x80
        }
    );
    assert!(Rgba8::from_hex("#fff").is_err());
    assert!(Rgba8::from_hex("#gggggg").is_err());
    assert!(Rgba8::from_hex("#ééé").is_err());
}

#[test]
fn premul_scales_channels_by_alpha() {
    assert_eq!(Rgba8::rgb(10, 20, 30).to_premul(), [10, 20, 30, 255]);
    assert_eq!(Rgba8::rgba_f(0, 0, 0, 0.0).to_premul(), [0, 0, 0, 0]);
    assert_eq!(
        Rgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 128
        }
        .to_premul(),
        [128, 128, 128, 128]
    );
}
