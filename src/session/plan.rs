use crate::audio::catalog::{AudioCatalog, AudioTrack};
use crate::audio::select::{AudioSelection, select_track};
use crate::content::pair::ContentPair;
use crate::foundation::error::{ReelError, ReelResult};
use crate::session::config::RenderConfig;
use crate::stage::model::Stage;
use crate::text::reflow::{AnswerLine, reflow_answer};
use crate::text::typing::{self, RevealSchedule};
use crate::timing::duration::{DurationEstimate, estimate_duration, question_line_count};

/// Caller-provided values that replace the deterministic derivations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanOverrides {
    pub typing_intervals: Option<Vec<f64>>,
    pub audio_track: Option<AudioTrack>,
    pub audio_start_secs: Option<f64>,
    pub audio_volume: Option<f64>,
}

/// Every value a render derives from its content before the first frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderPlan {
    pub seed: String,
    /// Question as the typewriter shows it.
    pub question: String,
    pub typing_intervals_ms: Vec<f64>,
    pub question_lines: usize,
    pub answer_lines: Vec<AnswerLine>,
    pub durations: DurationEstimate,
    pub total_frames: u64,
    pub frame_duration_micros: u64,
    pub audio: Option<AudioSelection>,
}

impl RenderPlan {
    /// Typing intervals, then reflow, then durations, then audio selection.
    pub fn build(
        pair: &ContentPair,
        catalog: &AudioCatalog,
        overrides: &PlanOverrides,
        cfg: &RenderConfig,
    ) -> ReelResult<Self> {
        pair.validate()?;
        let seed = pair.seed();

        let typing_intervals_ms = match &overrides.typing_intervals {
            Some(given) => {
                RevealSchedule::build(&pair.question, given)?;
                given.clone()
            }
            None => typing::generate_typing_intervals(&pair.question, &seed),
        };
        let question_lines = question_line_count(&pair.question);
        let answer_lines = reflow_answer(&pair.answer);
        let durations = estimate_duration(question_lines, &typing_intervals_ms, answer_lines.len());

        let audio = resolve_audio(catalog, overrides, durations.total, &seed, cfg)?;

        Ok(Self {
            question: typing::display_text(&pair.question),
            typing_intervals_ms,
            question_lines,
            answer_lines,
            total_frames: cfg.fps.frames_for_secs_ceil(durations.total),
            frame_duration_micros: cfg.fps.frame_duration_micros(),
            durations,
            audio,
            seed,
        })
    }

    pub fn reveal_schedule(&self) -> ReelResult<RevealSchedule> {
        RevealSchedule::build(&self.question, &self.typing_intervals_ms)
    }

    /// Lay out a stage for this plan.
    pub fn stage(&self, cfg: &RenderConfig) -> Stage {
        Stage::for_content(cfg.canvas, &cfg.theme, &self.question, &self.answer_lines)
    }

    /// Progress of frame `i`: `i / (total_frames - 1)`, and 1 for a single-frame video.
    pub fn frame_progress(&self, i: u64) -> f64 {
        if self.total_frames <= 1 {
            1.0
        } else {
            i as f64 / (self.total_frames - 1) as f64
        }
    }
}

fn resolve_audio(
    catalog: &AudioCatalog,
    overrides: &PlanOverrides,
    required_secs: f64,
    seed: &str,
    cfg: &RenderConfig,
) -> ReelResult<Option<AudioSelection>> {
    let selected = match &overrides.audio_track {
        Some(track) => Some(AudioSelection {
            volume: track.default_volume.unwrap_or(cfg.default_volume),
            track: track.clone(),
            start_secs: 0.0,
        }),
        None => select_track(catalog, required_secs, seed, cfg.default_volume),
    };
    let Some(mut sel) = selected else {
        return Ok(None);
    };
    if let Some(start) = overrides.audio_start_secs {
        if !start.is_finite() || start < 0.0 {
            return Err(ReelError::validation("audio start time must be finite and >= 0"));
        }
        sel.start_secs = start;
    }
    if let Some(volume) = overrides.audio_volume {
        if !volume.is_finite() || volume < 0.0 {
            return Err(ReelError::validation("audio volume must be finite and >= 0"));
        }
        sel.volume = volume;
    }
    Ok(Some(sel))
}

#[cfg(test)]
#[path = "../../tests/unit/session/plan.rs"]
mod tests;
