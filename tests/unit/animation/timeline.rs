use super::*;
use crate::foundation::core::Canvas;
use crate::stage::layout::{REVEAL_START_SCALE, Theme};
use crate::text::reflow::reflow_answer;
use crate::text::typing::generate_typing_intervals;
use crate::timing::duration::{estimate_duration, question_line_count};

const QUESTION: &str = "What is Rust?";
const ANSWER: &str = "A systems language.\n\nIt is memory safe without a garbage collector.";

fn fixture() -> (Stage, Timeline, DurationEstimate) {
    let lines = reflow_answer(ANSWER);
    let intervals = generate_typing_intervals(QUESTION, "seed");
    let durations = estimate_duration(question_line_count(QUESTION), &intervals, lines.len());
    let stage = Stage::for_content(
        Canvas {
            width: 1080,
            height: 1920,
        },
        &Theme::default(),
        QUESTION,
        &lines,
    );
    let schedule = RevealSchedule::build(QUESTION, &intervals).unwrap();
    let timeline = Timeline::build(&stage, &schedule, &durations, lines.len()).unwrap();
    (stage, timeline, durations)
}

#[test]
fn phases_are_ordered_and_cover_total() {
    let (_, timeline, durations) = fixture();
    let kinds: Vec<_> = timeline.phases().iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::Typewriter,
            PhaseKind::Settle,
            PhaseKind::Transition,
            PhaseKind::AnswerReveal,
            PhaseKind::CtaReveal,
            PhaseKind::FinalHold,
        ]
    );
    for pair in timeline.phases().windows(2) {
        assert!((pair[0].end() - pair[1].start).abs() < 1e-9);
    }
    assert!((timeline.total_secs() - durations.total).abs() < 1e-9);
}

#[test]
fn cta_starts_at_seventy_percent_of_answer_phase() {
    let (_, timeline, durations) = fixture();
    let cta = &timeline.phases()[4];
    let expected = durations.answer_start() + durations.answer * 0.7;
    assert!((cta.start - expected).abs() < 1e-9);
}

#[test]
fn build_fails_fast_when_elements_are_missing() {
    let (mut stage, _, durations) = fixture();
    stage.remove(ElementId::Cta);
    let schedule = RevealSchedule { times: Vec::new() };
    let err = Timeline::build(&stage, &schedule, &durations, 3).unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
    assert!(err.to_string().contains("Cta"));
}

#[test]
fn seek_start_shows_initial_state() {
    let (mut stage, timeline, _) = fixture();
    timeline.seek(&mut stage, 0.0);
    let q = stage.get(ElementId::QuestionText).unwrap();
    assert_eq!(q.state.visible_chars, Some(0));
    let line = stage.get(ElementId::AnswerLine(0)).unwrap();
    assert_eq!(line.state.opacity, 0.0);
    assert_eq!(line.state.scale, REVEAL_START_SCALE);
}

#[test]
fn seek_end_shows_everything_settled() {
    let (mut stage, timeline, _) = fixture();
    timeline.seek(&mut stage, timeline.total_secs());
    let q = stage.get(ElementId::QuestionText).unwrap();
    assert_eq!(q.state.visible_chars, Some(QUESTION.chars().count()));
    assert!((q.state.scale - PARKED_SCALE).abs() < 1e-9);
    let offset = stage.question_settle_offset().unwrap();
    assert!((q.state.translate.y - offset.y).abs() < 1e-9);
    for el in stage.elements() {
        assert_eq!(el.state.opacity, 1.0, "{:?}", el.id);
    }
    let cta = stage.get(ElementId::Cta).unwrap();
    assert!(cta.state.translate.y.abs() < 1e-9);
}

#[test]
fn seek_is_independent_of_previous_seeks() {
    let (mut stage, timeline, _) = fixture();
    let t = timeline.total_secs() * 0.6;
    timeline.seek(&mut stage, t);
    let direct = stage.state_fingerprint();
    timeline.seek(&mut stage, timeline.total_secs());
    timeline.seek(&mut stage, 0.1);
    timeline.seek(&mut stage, t);
    assert_eq!(direct, stage.state_fingerprint());
}

#[test]
fn seek_clamps_out_of_range_times() {
    let (mut stage, timeline, _) = fixture();
    timeline.seek(&mut stage, timeline.total_secs());
    let end = stage.state_fingerprint();
    timeline.seek(&mut stage, timeline.total_secs() + 100.0);
    assert_eq!(end, stage.state_fingerprint());
    timeline.seek(&mut stage, -3.0);
    let start = stage.state_fingerprint();
    timeline.seek(&mut stage, f64::NAN);
    assert_eq!(start, stage.state_fingerprint());
}

#[test]
fn answer_lines_are_staggered() {
    let (mut stage, timeline, durations) = fixture();
    timeline.seek(&mut stage, durations.answer_start() + 0.1);
    let first = stage.get(ElementId::AnswerLine(0)).unwrap().state.opacity;
    let second = stage.get(ElementId::AnswerLine(1)).unwrap().state.opacity;
    assert!(first > 0.0);
    assert_eq!(second, 0.0);
}

#[test]
fn phase_at_tracks_boundaries() {
    let (_, timeline, durations) = fixture();
    assert_eq!(timeline.phase_at(0.0), Some(PhaseKind::Typewriter));
    assert_eq!(
        timeline.phase_at(durations.question + 0.1),
        Some(PhaseKind::Transition)
    );
    assert_eq!(
        timeline.phase_at(durations.answer_start() + 0.01),
        Some(PhaseKind::AnswerReveal)
    );
    assert_eq!(
        timeline.phase_at(timeline.total_secs()),
        Some(PhaseKind::FinalHold)
    );
}
