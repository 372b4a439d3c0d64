use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::animation::timeline::Timeline;
use crate::audio::catalog::{AudioCatalog, AudioTrack};
use crate::audio::prepare::{AudioDecoder, PcmBuffer, prepare_audio};
use crate::content::pair::ContentPair;
use crate::encode::mux::{VideoBlob, finalize_blob};
use crate::encode::platform::{CapturePlatform, EncodeSession, VideoSample};
use crate::foundation::error::{ReelError, ReelResult};
use crate::session::config::RenderConfig;
use crate::session::plan::{PlanOverrides, RenderPlan};
use crate::stage::model::Stage;

/// Shared flag that stops a running render at the next frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reported after every submitted frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderProgress {
    pub frame: u64,
    pub total_frames: u64,
    /// `frame / (total_frames - 1)`, in `[0, 1]`.
    pub progress: f64,
    /// Timeline time the frame shows.
    pub time_secs: f64,
}

/// Summary of a finished render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStats {
    pub total_frames: u64,
    pub keyframes: u64,
    pub duration_secs: f64,
    pub has_audio: bool,
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Inputs of one render.
pub struct RenderRequest<'a> {
    pub question: String,
    pub answer: String,
    /// Candidates for the background track; ignored when `audio_track` is set.
    pub catalog: Option<&'a AudioCatalog>,
    pub typing_intervals: Option<Vec<f64>>,
    pub audio_track: Option<AudioTrack>,
    pub audio_start_secs: Option<f64>,
    pub audio_volume: Option<f64>,
    pub on_progress: Option<&'a mut dyn FnMut(RenderProgress)>,
    pub cancel: Option<CancelFlag>,
}

impl<'a> RenderRequest<'a> {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            catalog: None,
            typing_intervals: None,
            audio_track: None,
            audio_start_secs: None,
            audio_volume: None,
            on_progress: None,
            cancel: None,
        }
    }

    pub fn with_catalog(mut self, catalog: &'a AudioCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_typing_intervals(mut self, intervals: Vec<f64>) -> Self {
        self.typing_intervals = Some(intervals);
        self
    }

    pub fn with_audio_track(
        mut self,
        track: AudioTrack,
        start_secs: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        self.audio_track = Some(track);
        self.audio_start_secs = start_secs;
        self.audio_volume = volume;
        self
    }

    pub fn with_progress(mut self, f: &'a mut dyn FnMut(RenderProgress)) -> Self {
        self.on_progress = Some(f);
        self
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn overrides(&self) -> PlanOverrides {
        PlanOverrides {
            typing_intervals: self.typing_intervals.clone(),
            audio_track: self.audio_track.clone(),
            audio_start_secs: self.audio_start_secs,
            audio_volume: self.audio_volume,
        }
    }
}

#[derive(Debug)]
pub struct RenderOutput {
    pub blob: VideoBlob,
    pub plan: RenderPlan,
    pub stats: RenderStats,
}

/// Synthesize the video for one question/answer pair.
///
/// Order: capability probe, input validation, planning, timeline build, one-shot audio
/// preparation, then strictly sequential frames and the final mux. Nothing is captured before
/// the platform, the inputs and the stage have been checked. Any failure after `begin` aborts
/// the platform and no blob is returned.
#[tracing::instrument(skip_all, fields(platform = platform.name()))]
pub fn render(
    stage: &mut Stage,
    mut request: RenderRequest<'_>,
    platform: &mut dyn CapturePlatform,
    decoder: &dyn AudioDecoder,
    cfg: &RenderConfig,
) -> ReelResult<RenderOutput> {
    let started = Instant::now();
    if !platform.is_supported() {
        return Err(ReelError::config(format!(
            "platform '{}' lacks the required video/audio encoders",
            platform.name()
        )));
    }

    cfg.validate()?;
    if stage.canvas() != cfg.canvas {
        return Err(ReelError::config(format!(
            "render target is {}x{} but the output is {}x{}",
            stage.canvas().width,
            stage.canvas().height,
            cfg.canvas.width,
            cfg.canvas.height
        )));
    }
    let pair = ContentPair::new(request.question.as_str(), request.answer.as_str());
    let empty = AudioCatalog::default();
    let catalog = request.catalog.unwrap_or(&empty);
    let plan = RenderPlan::build(&pair, catalog, &request.overrides(), cfg)?;
    let timeline = Timeline::build(
        stage,
        &plan.reveal_schedule()?,
        &plan.durations,
        plan.answer_lines.len(),
    )?;

    let audio: Option<PcmBuffer> = plan
        .audio
        .as_ref()
        .map(|sel| prepare_audio(sel, plan.durations.total, decoder));

    let total_frames = plan.total_frames;
    if total_frames == 0 {
        return Err(ReelError::validation("render would produce zero frames"));
    }
    tracing::info!(
        seed = %plan.seed,
        total_frames,
        duration_secs = plan.durations.total,
        audio = plan.audio.as_ref().map(|a| a.track.id.as_str()).unwrap_or("none"),
        "render started"
    );

    let session = EncodeSession {
        spec: cfg.container_spec(),
        canvas: cfg.canvas,
        fps: cfg.fps,
        keyframe_interval: cfg.keyframe_interval,
        total_frames,
        audio: audio.as_ref(),
    };
    if let Err(e) = platform.begin(&session) {
        platform.abort();
        return Err(e);
    }

    let mut keyframes = 0u64;
    for i in 0..total_frames {
        if request.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            platform.abort();
            stage.reset_to_baseline();
            tracing::info!(frame = i, total_frames, "render cancelled");
            return Err(ReelError::Cancelled);
        }

        let progress = plan.frame_progress(i);
        let time_secs = progress * plan.durations.total;
        timeline.seek(stage, time_secs);
        stage.commit();

        let sample = VideoSample::nth(i, plan.frame_duration_micros, cfg.keyframe_interval);
        let submitted = platform
            .capture_frame(stage)
            .and_then(|frame| platform.encode_frame(&frame, sample));
        if let Err(e) = submitted {
            tracing::warn!(frame = i, error = %e, "frame submission failed; aborting render");
            platform.abort();
            return Err(e);
        }
        if sample.is_keyframe {
            keyframes += 1;
        }

        if let Some(cb) = request.on_progress.as_deref_mut() {
            cb(RenderProgress {
                frame: i,
                total_frames,
                progress,
                time_secs,
            });
        }
    }

    let blob = finalize_blob(platform, &session.spec)?;
    let stats = RenderStats {
        total_frames,
        keyframes,
        duration_secs: plan.durations.total,
        has_audio: audio.is_some(),
        bytes: blob.len(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        total_frames,
        keyframes,
        bytes = stats.bytes,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "render finished"
    );
    Ok(RenderOutput { blob, plan, stats })
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
