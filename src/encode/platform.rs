use crate::audio::prepare::PcmBuffer;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::FrameRGBA;
use crate::stage::model::Stage;

/// Fixed output format: one VP9 video track and at most one Opus track in WebM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ContainerSpec {
    pub container: &'static str,
    pub mime_type: &'static str,
    pub video_codec: &'static str,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub audio_codec: &'static str,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

impl ContainerSpec {
    pub const WEBM_VERTICAL: Self = Self {
        container: "webm",
        mime_type: "video/webm",
        video_codec: "vp9",
        width: 1080,
        height: 1920,
        fps: Fps { num: 24, den: 1 },
        audio_codec: "opus",
        audio_sample_rate: 48_000,
        audio_channels: 2,
    };

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

/// One encoded video sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoSample {
    pub index: FrameIndex,
    pub timestamp_micros: u64,
    pub duration_micros: u64,
    pub is_keyframe: bool,
}

impl VideoSample {
    /// Sample `i` of a stream with fixed `frame_duration_micros`.
    pub fn nth(i: u64, frame_duration_micros: u64, keyframe_interval: u64) -> Self {
        Self {
            index: FrameIndex(i),
            timestamp_micros: i * frame_duration_micros,
            duration_micros: frame_duration_micros,
            is_keyframe: keyframe_interval != 0 && i.is_multiple_of(keyframe_interval),
        }
    }
}

/// Everything a platform needs to know before the first frame.
#[derive(Clone, Copy, Debug)]
pub struct EncodeSession<'a> {
    pub spec: ContainerSpec,
    pub canvas: Canvas,
    pub fps: Fps,
    pub keyframe_interval: u64,
    pub total_frames: u64,
    /// Prepared soundtrack; `None` produces a video-only container.
    pub audio: Option<&'a PcmBuffer>,
}

impl EncodeSession<'_> {
    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if self.keyframe_interval == 0 {
            return Err(ReelError::validation("keyframe interval must be > 0"));
        }
        if let Some(audio) = self.audio
            && (audio.sample_rate != self.spec.audio_sample_rate
                || audio.channels != self.spec.audio_channels)
        {
            return Err(ReelError::validation(format!(
                "audio must be {} Hz with {} channels, got {} Hz with {}",
                self.spec.audio_sample_rate,
                self.spec.audio_channels,
                audio.sample_rate,
                audio.channels
            )));
        }
        Ok(())
    }
}

/// Capture and encode primitives of an execution environment.
///
/// Call order: `is_supported`, `begin`, then `capture_frame` + `encode_frame` once per frame in
/// order, then `finalize`. `abort` may be called at any point after `begin` and must release
/// every resource the platform holds.
pub trait CapturePlatform {
    fn name(&self) -> &str;

    /// Whether the encode primitives this platform needs are available.
    fn is_supported(&mut self) -> bool;

    fn begin(&mut self, session: &EncodeSession<'_>) -> ReelResult<()>;

    /// Snapshot the stage as a fixed-size bitmap.
    fn capture_frame(&mut self, stage: &Stage) -> ReelResult<FrameRGBA>;

    fn encode_frame(&mut self, frame: &FrameRGBA, sample: VideoSample) -> ReelResult<()>;

    /// Mux everything submitted so far into the finished container bytes.
    fn finalize(&mut self) -> ReelResult<Vec<u8>>;

    fn abort(&mut self);
}

/// Rejects samples whose index or timestamp does not increase.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleOrder {
    last: Option<VideoSample>,
}

impl SampleOrder {
    pub fn check(&mut self, sample: VideoSample) -> ReelResult<()> {
        if let Some(last) = self.last
            && (sample.index <= last.index || sample.timestamp_micros <= last.timestamp_micros)
        {
            return Err(ReelError::encode(format!(
                "out-of-order sample {} (ts {}us) after {} (ts {}us)",
                sample.index.0, sample.timestamp_micros, last.index.0, last.timestamp_micros
            )));
        }
        self.last = Some(sample);
        Ok(())
    }

    pub fn last(&self) -> Option<VideoSample> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/platform.rs"]
mod tests;
