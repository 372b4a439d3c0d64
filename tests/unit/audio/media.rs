use super::*;

#[test]
fn f32le_parsing_requires_alignment() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0.5f32.to_le_bytes());
    bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
    assert_eq!(f32le_to_samples(&bytes).unwrap(), vec![0.5, -1.0]);
    bytes.push(0);
    assert!(matches!(
        f32le_to_samples(&bytes).unwrap_err(),
        ReelError::Audio(_)
    ));
}

#[test]
fn frames_count_interleaved_samples() {
    let pcm = AudioPcm {
        sample_rate: 44_100,
        channels: 2,
        interleaved_f32: vec![0.0; 10],
    };
    assert_eq!(pcm.frames(), 5);
}

#[test]
fn missing_tool_is_an_audio_error() {
    let err = probe_audio("reelsynth-no-such-ffprobe", Path::new("x.ogg")).unwrap_err();
    assert!(matches!(err, ReelError::Audio(_)));
}
