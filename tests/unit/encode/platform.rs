use super::*;

#[test]
fn nth_sample_timing() {
    let s = VideoSample::nth(5, 41_666, 48);
    assert_eq!(s.index, FrameIndex(5));
    assert_eq!(s.timestamp_micros, 208_330);
    assert_eq!(s.duration_micros, 41_666);
    assert!(!s.is_keyframe);
    assert!(VideoSample::nth(0, 41_666, 48).is_keyframe);
    assert!(VideoSample::nth(96, 41_666, 48).is_keyframe);
}

#[test]
fn sample_order_rejects_repeats() {
    let mut order = SampleOrder::default();
    order.check(VideoSample::nth(0, 100, 10)).unwrap();
    order.check(VideoSample::nth(1, 100, 10)).unwrap();
    let err = order.check(VideoSample::nth(1, 100, 10)).unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    order.reset();
    assert!(order.last().is_none());
}

#[test]
fn session_rejects_wrong_audio_format() {
    let audio = PcmBuffer {
        sample_rate: 44_100,
        channels: 2,
        interleaved_f32: Vec::new(),
    };
    let spec = ContainerSpec::WEBM_VERTICAL;
    let session = EncodeSession {
        spec,
        canvas: spec.canvas(),
        fps: spec.fps,
        keyframe_interval: 48,
        total_frames: 10,
        audio: Some(&audio),
    };
    assert!(session.validate().is_err());
    let silent = PcmBuffer::silent(10);
    let ok = EncodeSession {
        audio: Some(&silent),
        ..session
    };
    ok.validate().unwrap();
}

#[test]
fn webm_spec_is_vertical_vp9() {
    let spec = ContainerSpec::WEBM_VERTICAL;
    assert_eq!(spec.canvas().width * 16, spec.canvas().height * 9);
    assert_eq!(spec.video_codec, "vp9");
    assert_eq!(spec.audio_codec, "opus");
    assert_eq!(spec.mime_type, "video/webm");
}
