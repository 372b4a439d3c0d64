use super::*;
use crate::audio::prepare::PcmBuffer;
use crate::foundation::core::Canvas;

fn session(audio: Option<&PcmBuffer>) -> EncodeSession<'_> {
    let spec = ContainerSpec::WEBM_VERTICAL;
    EncodeSession {
        spec,
        canvas: spec.canvas(),
        fps: spec.fps,
        keyframe_interval: 2,
        total_frames: 3,
        audio,
    }
}

fn stage() -> Stage {
    Stage::new(Canvas {
        width: 1080,
        height: 1920,
    })
}

#[test]
fn records_samples_and_finalizes_json() {
    let audio = PcmBuffer::silent(480);
    let mut p = InMemoryPlatform::new();
    assert!(p.is_supported());
    p.begin(&session(Some(&audio))).unwrap();
    let mut st = stage();
    for i in 0..3 {
        st.commit();
        let frame = p.capture_frame(&st).unwrap();
        assert_eq!(frame.width, FINGERPRINT_SIZE);
        p.encode_frame(&frame, VideoSample::nth(i, 1000, 2)).unwrap();
    }
    let bytes = p.finalize().unwrap();
    let container = MemoryContainer::from_bytes(&bytes).unwrap();
    assert_eq!(container.container, "webm");
    assert_eq!(container.video.codec, "vp9");
    assert_eq!(container.video.samples.len(), 3);
    assert_eq!(container.video.frame_hashes.len(), 3);
    let audio = container.audio.unwrap();
    assert_eq!(audio.codec, "opus");
    assert_eq!(audio.frames, 480);
    assert_eq!(audio.peak, 0.0);
    assert_eq!(p.samples().len(), 3);
}

#[test]
fn identical_stage_states_capture_identical_frames() {
    let mut p = InMemoryPlatform::new();
    p.begin(&session(None)).unwrap();
    let mut st = stage();
    st.commit();
    let a = p.capture_frame(&st).unwrap();
    st.commit();
    let b = p.capture_frame(&st).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn capture_requires_commit_tick() {
    let mut p = InMemoryPlatform::new();
    p.begin(&session(None)).unwrap();
    let mut st = stage();
    st.commit();
    p.capture_frame(&st).unwrap();
    assert!(p.capture_frame(&st).is_err());
}

#[test]
fn simulated_failure_and_abort() {
    let mut p = InMemoryPlatform::failing_at(1);
    p.begin(&session(None)).unwrap();
    let mut st = stage();
    st.commit();
    let f = p.capture_frame(&st).unwrap();
    p.encode_frame(&f, VideoSample::nth(0, 1000, 2)).unwrap();
    st.commit();
    let f = p.capture_frame(&st).unwrap();
    let err = p.encode_frame(&f, VideoSample::nth(1, 1000, 2)).unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    p.abort();
    assert!(p.was_aborted());
    assert_eq!(p.events().last(), Some(&PlatformEvent::Abort));
}

#[test]
fn unsupported_platform_reports_so() {
    let mut p = InMemoryPlatform::unsupported();
    assert!(!p.is_supported());
    assert_eq!(p.events(), &[PlatformEvent::Probe]);
}

#[test]
fn finalize_before_begin_fails() {
    let mut p = InMemoryPlatform::new();
    assert!(p.finalize().is_err());
}
