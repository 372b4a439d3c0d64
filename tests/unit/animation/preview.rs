use super::*;
use crate::foundation::core::Canvas;
use crate::stage::layout::Theme;
use crate::stage::model::ElementId;
use crate::text::reflow::reflow_answer;
use crate::text::typing::{RevealSchedule, generate_typing_intervals};
use crate::timing::duration::{estimate_duration, question_line_count};

fn fixture() -> (Stage, Timeline) {
    let question = "Why loop?";
    let lines = reflow_answer("Because previews repeat.");
    let intervals = generate_typing_intervals(question, "loop");
    let durations = estimate_duration(question_line_count(question), &intervals, lines.len());
    let stage = Stage::for_content(
        Canvas {
            width: 540,
            height: 960,
        },
        &Theme::default(),
        question,
        &lines,
    );
    let schedule = RevealSchedule::build(question, &intervals).unwrap();
    let timeline = Timeline::build(&stage, &schedule, &durations, lines.len()).unwrap();
    (stage, timeline)
}

#[test]
fn preview_wraps_around_total() {
    let (mut stage, timeline) = fixture();
    let total = timeline.total_secs();
    let clock = ManualClock::new();
    let mut preview = timeline.play_loop(&mut stage, &clock);

    let first = preview.tick();
    assert_eq!(first.lap, 0);
    assert_eq!(first.time, 0.0);
    assert_eq!(first.phase, Some(PhaseKind::Typewriter));

    clock.advance(Duration::from_secs_f64(total + 0.25));
    let wrapped = preview.tick();
    assert_eq!(wrapped.lap, 1);
    assert!((wrapped.time - 0.25).abs() < 1e-6);
}

#[test]
fn preview_matches_direct_seek() {
    let (mut stage, timeline) = fixture();
    let mut reference = stage.clone();
    let clock = ManualClock::new();
    clock.advance(Duration::from_millis(5_000));
    let tick = {
        let mut preview = timeline.play_loop(&mut stage, &clock);
        preview.tick()
    };
    timeline.seek(&mut reference, tick.time);
    assert_eq!(stage.state_fingerprint(), reference.state_fingerprint());
}

#[test]
fn stopping_releases_the_stage() {
    let (mut stage, timeline) = fixture();
    let preview = timeline.play_loop(&mut stage, ManualClock::new());
    let clock = preview.stop();
    assert_eq!(clock.elapsed(), Duration::ZERO);
    timeline.seek(&mut stage, timeline.total_secs());
    assert_eq!(stage.get(ElementId::Cta).unwrap().state.opacity, 1.0);
}
