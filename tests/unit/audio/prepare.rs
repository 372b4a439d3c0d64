use super::*;

struct FixedDecoder(ReelResult<AudioPcm>);

impl AudioDecoder for FixedDecoder {
    fn decode(&self, _track: &AudioTrack) -> ReelResult<AudioPcm> {
        match &self.0 {
            Ok(pcm) => Ok(pcm.clone()),
            Err(e) => Err(ReelError::audio(e.to_string())),
        }
    }
}

fn selection(start_secs: f64, volume: f64) -> AudioSelection {
    AudioSelection {
        track: AudioTrack {
            id: "t".to_string(),
            name: String::new(),
            artist: String::new(),
            duration_seconds: 1.0,
            source_url: "t.ogg".to_string(),
            tags: Vec::new(),
            default_volume: None,
        },
        start_secs,
        volume,
    }
}

fn constant(rate: u32, channels: u16, frames: usize, value: f32) -> AudioPcm {
    AudioPcm {
        sample_rate: rate,
        channels,
        interleaved_f32: vec![value; frames * usize::from(channels)],
    }
}

#[test]
fn required_frames_rounds_up() {
    assert_eq!(required_frames(1.0, 48_000), 48_000);
    assert_eq!(required_frames(0.00001, 48_000), 1);
    assert_eq!(required_frames(0.0, 48_000), 0);
    assert_eq!(required_frames(7.5, 48_000), 360_000);
}

#[test]
fn window_past_source_end_is_exact_silence() {
    let pcm = constant(48_000, 2, 48_000, 0.5);
    let buf = extract_window(&pcm, 0.5, 48_000, 1.0).unwrap();
    assert_eq!(buf.frames(), 48_000);
    assert!(buf.interleaved_f32[..48_000].iter().all(|&s| s == 0.5));
    assert!(buf.interleaved_f32[48_000..].iter().all(|&s| s == 0.0));
}

#[test]
fn window_beyond_source_is_all_silence() {
    let pcm = constant(48_000, 2, 100, 0.5);
    let buf = extract_window(&pcm, 10.0, 500, 1.0).unwrap();
    assert!(buf.is_silent());
}

#[test]
fn mono_is_duplicated_and_volume_clamped() {
    let pcm = constant(48_000, 1, 10, 0.8);
    let buf = extract_window(&pcm, 0.0, 10, 2.0).unwrap();
    assert_eq!(buf.channels, 2);
    assert!(buf.interleaved_f32.iter().all(|&s| s == 1.0));

    let quiet = extract_window(&pcm, 0.0, 10, 0.5).unwrap();
    assert!((quiet.interleaved_f32[0] - 0.4).abs() < 1e-6);
    assert_eq!(quiet.interleaved_f32[0], quiet.interleaved_f32[1]);
}

#[test]
fn window_requires_mix_rate() {
    let pcm = constant(44_100, 2, 10, 0.1);
    assert!(extract_window(&pcm, 0.0, 10, 1.0).is_err());
}

#[test]
fn prepare_resamples_to_mix_rate() {
    let decoder = FixedDecoder(Ok(constant(24_000, 2, 24_000, 0.25)));
    let buf = prepare_audio(&selection(0.0, 1.0), 2.0, &decoder);
    assert_eq!(buf.sample_rate, MIX_SAMPLE_RATE);
    assert_eq!(buf.frames(), 96_000);
    assert!((buf.interleaved_f32[0] - 0.25).abs() < 1e-6);
    // One second of source, two seconds requested.
    assert!(buf.interleaved_f32[48_000 * 2..].iter().all(|&s| s == 0.0));
}

#[test]
fn decode_failure_falls_back_to_full_length_silence() {
    let decoder = FixedDecoder(Err(ReelError::audio("corrupt")));
    let buf = prepare_audio(&selection(3.0, 0.5), 1.5, &decoder);
    assert_eq!(buf.channels, 2);
    assert_eq!(buf.frames(), 72_000);
    assert!(buf.is_silent());
}

#[test]
fn invalid_volume_falls_back_to_silence() {
    let decoder = FixedDecoder(Ok(constant(48_000, 2, 48_000, 0.25)));
    let buf = prepare_audio(&selection(0.0, f64::NAN), 1.0, &decoder);
    assert!(buf.is_silent());
    assert_eq!(buf.frames(), 48_000);
}

#[test]
fn write_f32le_round_trips_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mix.f32le");
    let buf = PcmBuffer {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: vec![0.5, -0.5, 1.0, 0.0],
    };
    buf.write_f32le(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[0..4], &0.5f32.to_le_bytes());
}
