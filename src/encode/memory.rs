use crate::encode::platform::{CapturePlatform, ContainerSpec, EncodeSession, SampleOrder, VideoSample};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;
use crate::render::backend::FrameRGBA;
use crate::stage::model::Stage;

/// Side length of the fingerprint bitmaps the in-memory platform captures.
pub const FINGERPRINT_SIZE: u32 = 4;

/// Calls observed by an [`InMemoryPlatform`], in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    Probe,
    Begin,
    Capture,
    Encode(u64),
    Finalize,
    Abort,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryVideoTrack {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub samples: Vec<VideoSample>,
    /// FNV-1a hash of each captured bitmap, by sample.
    pub frame_hashes: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryAudioTrack {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
    pub peak: f32,
}

/// JSON description of a finished in-memory "container".
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryContainer {
    pub container: String,
    pub video: MemoryVideoTrack,
    pub audio: Option<MemoryAudioTrack>,
}

impl MemoryContainer {
    pub fn from_bytes(bytes: &[u8]) -> ReelResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ReelError::serde(format!("memory container: {e}")))
    }
}

/// Hermetic capture platform that records samples instead of encoding them.
///
/// Captures are tiny bitmaps derived from the stage's state fingerprint, so identical stage
/// states produce identical frames.
#[derive(Debug)]
pub struct InMemoryPlatform {
    supported: bool,
    fail_at: Option<u64>,
    events: Vec<PlatformEvent>,
    video: Option<MemoryVideoTrack>,
    audio: Option<MemoryAudioTrack>,
    order: SampleOrder,
    last_generation: Option<u64>,
    aborted: bool,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_at: None,
            events: Vec::new(),
            video: None,
            audio: None,
            order: SampleOrder::default(),
            last_generation: None,
            aborted: false,
        }
    }

    /// Report the platform as lacking encode support.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Fail `encode_frame` for sample `index`.
    pub fn failing_at(index: u64) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::new()
        }
    }

    pub fn events(&self) -> &[PlatformEvent] {
        &self.events
    }

    pub fn samples(&self) -> &[VideoSample] {
        self.video
            .as_ref()
            .map(|v| v.samples.as_slice())
            .unwrap_or(&[])
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    pub fn frames_captured(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PlatformEvent::Capture))
            .count()
    }
}

impl CapturePlatform for InMemoryPlatform {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_supported(&mut self) -> bool {
        self.events.push(PlatformEvent::Probe);
        self.supported
    }

    fn begin(&mut self, session: &EncodeSession<'_>) -> ReelResult<()> {
        self.events.push(PlatformEvent::Begin);
        session.validate()?;
        let spec: ContainerSpec = session.spec;
        self.video = Some(MemoryVideoTrack {
            codec: spec.video_codec.to_string(),
            width: session.canvas.width,
            height: session.canvas.height,
            fps_num: session.fps.num,
            fps_den: session.fps.den,
            samples: Vec::with_capacity(session.total_frames as usize),
            frame_hashes: Vec::with_capacity(session.total_frames as usize),
        });
        self.audio = session.audio.map(|pcm| MemoryAudioTrack {
            codec: spec.audio_codec.to_string(),
            sample_rate: pcm.sample_rate,
            channels: pcm.channels,
            frames: pcm.frames(),
            peak: pcm
                .interleaved_f32
                .iter()
                .fold(0.0f32, |m, s| m.max(s.abs())),
        });
        self.order.reset();
        self.last_generation = None;
        self.aborted = false;
        Ok(())
    }

    fn capture_frame(&mut self, stage: &Stage) -> ReelResult<FrameRGBA> {
        self.events.push(PlatformEvent::Capture);
        if self.video.is_none() {
            return Err(ReelError::encode("memory platform not started"));
        }
        let generation = stage.generation();
        if self.last_generation == Some(generation) {
            return Err(ReelError::encode(
                "stage was not committed since the previous capture",
            ));
        }
        self.last_generation = Some(generation);

        let seed = stage.state_fingerprint();
        let px = (FINGERPRINT_SIZE * FINGERPRINT_SIZE) as usize;
        let mut data = Vec::with_capacity(px * 4);
        for i in 0..px {
            let mut h = Fnv1a64::new_default();
            h.write_u64(seed);
            h.write_u64(i as u64);
            let v = h.finish().to_le_bytes();
            data.extend_from_slice(&[v[0], v[1], v[2], 255]);
        }
        Ok(FrameRGBA {
            width: FINGERPRINT_SIZE,
            height: FINGERPRINT_SIZE,
            data,
            premultiplied: true,
        })
    }

    fn encode_frame(&mut self, frame: &FrameRGBA, sample: VideoSample) -> ReelResult<()> {
        self.events.push(PlatformEvent::Encode(sample.index.0));
        if self.fail_at == Some(sample.index.0) {
            return Err(ReelError::encode(format!(
                "simulated encoder failure at frame {}",
                sample.index.0
            )));
        }
        self.order.check(sample)?;
        let video = self
            .video
            .as_mut()
            .ok_or_else(|| ReelError::encode("memory platform not started"))?;
        let mut h = Fnv1a64::new_default();
        h.write_bytes(&frame.data);
        video.samples.push(sample);
        video.frame_hashes.push(h.finish());
        Ok(())
    }

    fn finalize(&mut self) -> ReelResult<Vec<u8>> {
        self.events.push(PlatformEvent::Finalize);
        let video = self
            .video
            .take()
            .ok_or_else(|| ReelError::encode("memory platform not started"))?;
        let container = MemoryContainer {
            container: ContainerSpec::WEBM_VERTICAL.container.to_string(),
            video: video.clone(),
            audio: self.audio.take(),
        };
        // Keep the samples inspectable after finalize.
        self.video = Some(video);
        serde_json::to_vec(&container).map_err(|e| ReelError::serde(e.to_string()))
    }

    fn abort(&mut self) {
        self.events.push(PlatformEvent::Abort);
        self.aborted = true;
        self.audio = None;
        self.order.reset();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/memory.rs"]
mod tests;
