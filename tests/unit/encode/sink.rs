use super::*;

fn cfg(mime: &str) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::whole(20).unwrap(),
        mime: mime.to_owned(),
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![v; 8],
        premultiplied: true,
    }
}

#[test]
fn captures_frames_and_returns_stream() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg("video/webm")).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2)).unwrap();
    let bytes = sink.end().unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[8..], &[2u8; 8]);
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.is_ended());
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg("video/webm")).unwrap();
    sink.push_frame(FrameIndex(3), &frame(0)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(0)).is_err());
    assert!(sink.push_frame(FrameIndex(1), &frame(0)).is_err());

    let wrong = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(4), &wrong).is_err());
}

#[test]
fn restricted_sink_refuses_other_types() {
    let mut sink = InMemorySink::supporting(["video/webm"]);
    assert!(sink.is_type_supported("VIDEO/WEBM"));
    assert!(!sink.is_type_supported("video/webm;codecs=vp9"));
    let err = sink.begin(cfg("video/mp4")).unwrap_err();
    assert!(matches!(err, MarkshotError::UnsupportedEncoder { .. }));
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg("video/webm")).unwrap();
    sink.push_frame(FrameIndex(0), &frame(9)).unwrap();
    sink.abort();
    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
    assert!(sink.end().is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(0)).is_err());
}
