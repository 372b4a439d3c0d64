use std::path::Path;
use std::process::Command;

use crate::foundation::error::{ReelError, ReelResult};

/// Stream facts of an audio source as reported by ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioSourceInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_sec: f64,
}

/// Interleaved PCM at some sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }
}

pub fn probe_audio(ffprobe_bin: &str, path: &Path) -> ReelResult<AudioSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u16>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::audio(format!("failed to run {ffprobe_bin}: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::audio(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::audio(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| ReelError::audio(format!("no audio stream in '{}'", path.display())))?;
    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| ReelError::audio("missing audio sample rate from ffprobe"))?;
    let channels = stream.channels.filter(|&c| c > 0).unwrap_or(2);
    let duration_sec = stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(AudioSourceInfo {
        sample_rate,
        channels,
        duration_sec,
    })
}

/// Decode `path` to interleaved f32 at its native rate.
///
/// Sources with more than two channels are downmixed to stereo by ffmpeg.
pub fn decode_audio_f32(
    ffmpeg_bin: &str,
    path: &Path,
    info: &AudioSourceInfo,
) -> ReelResult<AudioPcm> {
    let channels = info.channels.clamp(1, 2);
    let out = Command::new(ffmpeg_bin)
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &info.sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::audio(format!("failed to run {ffmpeg_bin} for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::audio(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    Ok(AudioPcm {
        sample_rate: info.sample_rate,
        channels,
        interleaved_f32: f32le_to_samples(&out.stdout)?,
    })
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> ReelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::audio(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/media.rs"]
mod tests;
