//! Phase-based animation over a [`Stage`].
//!
//! A [`Timeline`] is plain data: an ordered list of phases, each holding tracks that move one
//! element's properties from a start to an end value. Both preview playback and frame-exact
//! rendering go through [`Timeline::seek`], so the phase definitions exist exactly once.

use crate::animation::ease::Ease;
use crate::animation::tween::Tween;
use crate::foundation::core::Vec2;
use crate::foundation::error::{ReelError, ReelResult};
use crate::stage::model::{ElementId, Stage};
use crate::text::typing::RevealSchedule;
use crate::timing::duration::DurationEstimate;

/// Scale the question card grows to while it settles.
pub const SETTLE_SCALE: f64 = 1.03;
/// Scale of the question card once it has moved to the top slot.
pub const PARKED_SCALE: f64 = 0.85;
/// Delay between consecutive answer lines.
pub const LINE_STAGGER_SECS: f64 = 0.15;
pub const LINE_REVEAL_SECS: f64 = 0.6;
/// Fraction of the answer phase after which the call-to-action appears.
pub const CTA_START_FRACTION: f64 = 0.7;
pub const CTA_REVEAL_SECS: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PhaseKind {
    Typewriter,
    Settle,
    Transition,
    AnswerReveal,
    CtaReveal,
    FinalHold,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum PropertyChange {
    Opacity(Tween<f64>),
    Translate(Tween<Vec2>),
    Scale(Tween<f64>),
    /// Typewriter: characters appear at the schedule's times, measured from track start.
    Reveal(RevealSchedule),
}

/// Property changes of one element inside a phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Track {
    pub target: ElementId,
    /// Offset from the phase start.
    pub delay: f64,
    pub duration: f64,
    pub ease: Ease,
    pub changes: Vec<PropertyChange>,
}

impl Track {
    fn progress(&self, local: f64) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (local / self.duration).clamp(0.0, 1.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub start: f64,
    pub duration: f64,
    pub tracks: Vec<Track>,
}

impl Phase {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    phases: Vec<Phase>,
    total: f64,
}

impl Timeline {
    /// Elements every timeline animates, for a stage with `answer_lines` answer lines.
    pub fn required_elements(answer_lines: usize) -> Vec<ElementId> {
        let mut ids = vec![
            ElementId::Background,
            ElementId::QuestionCard,
            ElementId::QuestionText,
            ElementId::AnswerCard,
            ElementId::Cta,
        ];
        ids.extend((0..answer_lines).map(ElementId::AnswerLine));
        ids
    }

    /// Assemble the six phases for `stage`.
    ///
    /// Fails with a configuration error, before anything is built, when the stage lacks a
    /// required element.
    pub fn build(
        stage: &Stage,
        typing: &RevealSchedule,
        durations: &DurationEstimate,
        answer_lines: usize,
    ) -> ReelResult<Self> {
        stage.resolve(&Self::required_elements(answer_lines))?;
        let settle_offset = stage
            .question_settle_offset()
            .ok_or_else(|| ReelError::config("render target has no question card"))?;

        let mut phases = Vec::with_capacity(6);
        let mut cursor = 0.0;
        let mut push = |kind: PhaseKind, duration: f64, tracks: Vec<Track>| {
            phases.push(Phase {
                kind,
                start: cursor,
                duration,
                tracks,
            });
            cursor += duration;
        };

        push(
            PhaseKind::Typewriter,
            durations.typewriter,
            vec![Track {
                target: ElementId::QuestionText,
                delay: 0.0,
                duration: durations.typewriter,
                ease: Ease::Linear,
                changes: vec![PropertyChange::Reveal(typing.clone())],
            }],
        );

        let settle = (durations.question - durations.typewriter).max(0.0);
        let question_ids = [ElementId::QuestionCard, ElementId::QuestionText];
        push(
            PhaseKind::Settle,
            settle,
            question_ids
                .iter()
                .map(|&target| Track {
                    target,
                    delay: 0.0,
                    duration: settle,
                    ease: Ease::InOutQuad,
                    changes: vec![PropertyChange::Scale(Tween::new(1.0, SETTLE_SCALE))],
                })
                .collect(),
        );

        let mut transition_tracks: Vec<Track> = question_ids
            .iter()
            .map(|&target| Track {
                target,
                delay: 0.0,
                duration: durations.transition,
                ease: Ease::InOutCubic,
                changes: vec![
                    PropertyChange::Translate(Tween::new(Vec2::ZERO, settle_offset)),
                    PropertyChange::Scale(Tween::new(SETTLE_SCALE, PARKED_SCALE)),
                ],
            })
            .collect();
        transition_tracks.push(Track {
            target: ElementId::AnswerCard,
            delay: 0.0,
            duration: durations.transition,
            ease: Ease::OutCubic,
            changes: vec![PropertyChange::Opacity(Tween::new(0.0, 1.0))],
        });
        push(
            PhaseKind::Transition,
            durations.transition,
            transition_tracks,
        );

        let mut line_tracks = Vec::with_capacity(answer_lines);
        for i in 0..answer_lines {
            let id = ElementId::AnswerLine(i);
            let Some(line) = stage.get(id) else {
                continue;
            };
            let base = line.baseline;
            line_tracks.push(Track {
                target: id,
                delay: i as f64 * LINE_STAGGER_SECS,
                duration: LINE_REVEAL_SECS,
                ease: Ease::OutBack,
                changes: vec![
                    PropertyChange::Opacity(Tween::new(base.opacity, 1.0)),
                    PropertyChange::Translate(Tween::new(base.translate, Vec2::ZERO)),
                    PropertyChange::Scale(Tween::new(base.scale, 1.0)),
                ],
            });
        }
        push(
            PhaseKind::AnswerReveal,
            durations.answer * CTA_START_FRACTION,
            line_tracks,
        );

        let cta_phase = durations.answer * (1.0 - CTA_START_FRACTION);
        let cta_tracks = match stage.get(ElementId::Cta) {
            Some(cta) => vec![Track {
                target: ElementId::Cta,
                delay: 0.0,
                duration: CTA_REVEAL_SECS.min(cta_phase),
                ease: Ease::OutBack,
                changes: vec![
                    PropertyChange::Opacity(Tween::new(cta.baseline.opacity, 1.0)),
                    PropertyChange::Translate(Tween::new(cta.baseline.translate, Vec2::ZERO)),
                ],
            }],
            None => Vec::new(),
        };
        push(PhaseKind::CtaReveal, cta_phase, cta_tracks);
        push(PhaseKind::FinalHold, durations.hold, Vec::new());

        let timeline = Self {
            total: cursor,
            phases,
        };
        timeline.validate(durations.total)?;
        Ok(timeline)
    }

    fn validate(&self, expected_total: f64) -> ReelResult<()> {
        if (self.total - expected_total).abs() > 1e-6 {
            return Err(ReelError::validation(format!(
                "timeline phases span {:.6}s but the estimate is {:.6}s",
                self.total, expected_total
            )));
        }
        for pair in self.phases.windows(2) {
            if pair[1].start < pair[0].start {
                return Err(ReelError::validation("timeline phases are out of order"));
            }
        }
        Ok(())
    }

    pub fn total_secs(&self) -> f64 {
        self.total
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Phase active at `t` (clamped to the timeline).
    pub fn phase_at(&self, t: f64) -> Option<PhaseKind> {
        let t = self.clamp_time(t);
        self.phases
            .iter()
            .find(|p| t < p.end())
            .or_else(|| self.phases.last())
            .map(|p| p.kind)
    }

    fn clamp_time(&self, t: f64) -> f64 {
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.total)
        }
    }

    /// Put `stage` into the state it has at `t` seconds.
    ///
    /// Independent of any previous seek: the stage is reset to its baseline first, then every
    /// phase that has started is applied in order with clamped progress.
    pub fn seek(&self, stage: &mut Stage, t: f64) {
        let t = self.clamp_time(t);
        stage.reset_to_baseline();
        for phase in &self.phases {
            if phase.start > t {
                break;
            }
            let local = t - phase.start;
            for track in &phase.tracks {
                let elapsed = local - track.delay;
                if elapsed < 0.0 {
                    continue;
                }
                let Some(el) = stage.get_mut(track.target) else {
                    continue;
                };
                let eased = track.ease.apply(track.progress(elapsed));
                for change in &track.changes {
                    match change {
                        PropertyChange::Opacity(tw) => {
                            el.state.opacity = tw.sample(eased).clamp(0.0, 1.0);
                        }
                        PropertyChange::Translate(tw) => el.state.translate = tw.sample(eased),
                        PropertyChange::Scale(tw) => el.state.scale = tw.sample(eased),
                        PropertyChange::Reveal(schedule) => {
                            el.state.visible_chars = Some(schedule.visible_at(elapsed));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
