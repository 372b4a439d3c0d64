use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audio::catalog::AudioTrack;
use crate::audio::media::{self, AudioPcm};
use crate::audio::resample::resample_linear;
use crate::audio::select::AudioSelection;
use crate::foundation::error::{ReelError, ReelResult};

/// Output sample rate of every prepared buffer.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
pub const MIX_CHANNELS: u16 = 2;

/// Turns a catalog track into PCM at its native rate.
pub trait AudioDecoder {
    fn decode(&self, track: &AudioTrack) -> ReelResult<AudioPcm>;
}

/// Decoder backed by the `ffprobe`/`ffmpeg` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegAudioDecoder {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    /// Directory relative track paths are resolved against.
    pub base_dir: Option<PathBuf>,
}

impl FfmpegAudioDecoder {
    pub fn new(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl AudioDecoder for FfmpegAudioDecoder {
    fn decode(&self, track: &AudioTrack) -> ReelResult<AudioPcm> {
        let path = track.source_path(self.base_dir.as_deref());
        let info = media::probe_audio(&self.ffprobe_bin, &path)?;
        media::decode_audio_f32(&self.ffmpeg_bin, &path, &info)
    }
}

/// Stereo PCM at [`MIX_SAMPLE_RATE`] covering exactly the video duration.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl PcmBuffer {
    pub fn silent(frames: usize) -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
            interleaved_f32: vec![0.0; frames * usize::from(MIX_CHANNELS)],
        }
    }

    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_silent(&self) -> bool {
        self.interleaved_f32.iter().all(|&s| s == 0.0)
    }

    /// Write raw little-endian `f32` samples, the format the encoder reads.
    pub fn write_f32le(&self, out_path: &Path) -> ReelResult<()> {
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("create audio output directory '{}'", parent.display())
            })?;
        }
        let mut bytes = Vec::<u8>::with_capacity(self.interleaved_f32.len() * 4);
        for &sample in &self.interleaved_f32 {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes)
            .with_context(|| format!("write audio file '{}'", out_path.display()))?;
        Ok(())
    }
}

/// `ceil(secs * rate)` output frames.
pub fn required_frames(required_secs: f64, sample_rate: u32) -> usize {
    if !required_secs.is_finite() || required_secs <= 0.0 {
        return 0;
    }
    (required_secs * f64::from(sample_rate) - 1e-9).ceil().max(0.0) as usize
}

/// Cut `frames` frames starting at `start_secs` out of `pcm` (already at the output rate).
///
/// Frames past the end of the source are silent. Volume is applied, then every sample is
/// clamped to `[-1, 1]`; mono input is duplicated to both channels.
pub fn extract_window(
    pcm: &AudioPcm,
    start_secs: f64,
    frames: usize,
    volume: f64,
) -> ReelResult<PcmBuffer> {
    if pcm.sample_rate != MIX_SAMPLE_RATE {
        return Err(ReelError::audio(format!(
            "window extraction expects {MIX_SAMPLE_RATE} Hz input, got {}",
            pcm.sample_rate
        )));
    }
    if pcm.channels == 0 {
        return Err(ReelError::audio("audio source has no channels"));
    }

    let src_channels = usize::from(pcm.channels);
    let src_frames = pcm.frames();
    let start = (start_secs.max(0.0) * f64::from(MIX_SAMPLE_RATE)).floor() as usize;
    let gain = volume as f32;
    let mut out = PcmBuffer::silent(frames);

    for (i, dst) in out.interleaved_f32.chunks_exact_mut(2).enumerate() {
        let Some(src_frame) = start.checked_add(i).filter(|&f| f < src_frames) else {
            break;
        };
        let idx = src_frame * src_channels;
        let l = pcm.interleaved_f32[idx];
        let r = if src_channels == 1 {
            l
        } else {
            pcm.interleaved_f32[idx + 1]
        };
        dst[0] = (l * gain).clamp(-1.0, 1.0);
        dst[1] = (r * gain).clamp(-1.0, 1.0);
    }
    Ok(out)
}

/// Decode, resample and window the selected track for a video of `required_secs`.
///
/// Never fails: any decode or resample problem is logged and replaced with silence of the
/// full duration, so a bad track cannot block a render.
#[tracing::instrument(skip_all, fields(track = %selection.track.id, start = selection.start_secs))]
pub fn prepare_audio(
    selection: &AudioSelection,
    required_secs: f64,
    decoder: &dyn AudioDecoder,
) -> PcmBuffer {
    let frames = required_frames(required_secs, MIX_SAMPLE_RATE);
    match try_prepare(selection, frames, decoder) {
        Ok(buf) => {
            tracing::debug!(frames, "audio prepared");
            buf
        }
        Err(e) => {
            tracing::warn!(error = %e, "audio preparation failed; using silence");
            PcmBuffer::silent(frames)
        }
    }
}

fn try_prepare(
    selection: &AudioSelection,
    frames: usize,
    decoder: &dyn AudioDecoder,
) -> ReelResult<PcmBuffer> {
    if !selection.volume.is_finite() || selection.volume < 0.0 {
        return Err(ReelError::audio("audio volume must be finite and >= 0"));
    }
    let decoded = decoder.decode(&selection.track)?;
    if decoded.sample_rate == 0 {
        return Err(ReelError::audio("decoded audio reports a zero sample rate"));
    }
    let pcm = resample_linear(&decoded, MIX_SAMPLE_RATE);
    extract_window(&pcm, selection.start_secs, frames, selection.volume)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/prepare.rs"]
mod tests;
