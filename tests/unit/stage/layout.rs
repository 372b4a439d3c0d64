use super::*;
use crate::text::reflow::reflow_answer;

fn canvas() -> Canvas {
    Canvas {
        width: 1080,
        height: 1920,
    }
}

#[test]
fn standard_stage_has_every_element() {
    let lines = reflow_answer("First para.\n\nSecond para.");
    let stage = Stage::for_content(canvas(), &Theme::default(), "What is Rust?", &lines);
    stage
        .resolve(&[
            ElementId::Background,
            ElementId::QuestionCard,
            ElementId::QuestionText,
            ElementId::AnswerCard,
            ElementId::AnswerLine(0),
            ElementId::AnswerLine(1),
            ElementId::Cta,
        ])
        .unwrap();
    assert!(stage.get(ElementId::AnswerLine(2)).is_none());
}

#[test]
fn question_text_starts_hidden_and_answer_lines_start_transparent() {
    let lines = reflow_answer("One. Two.");
    let stage = Stage::for_content(canvas(), &Theme::default(), "Q?", &lines);
    let q = stage.get(ElementId::QuestionText).unwrap();
    assert_eq!(q.baseline.visible_chars, Some(0));
    for i in 0..lines.len() {
        let line = stage.get(ElementId::AnswerLine(i)).unwrap();
        assert_eq!(line.baseline.opacity, 0.0);
        assert_eq!(line.baseline.scale, REVEAL_START_SCALE);
    }
}

#[test]
fn paragraph_breaks_add_vertical_space() {
    let joined = reflow_answer("Alpha. Beta.");
    let split = reflow_answer("Alpha.\n\nBeta.");
    let a = Stage::for_content(canvas(), &Theme::default(), "Q", &joined);
    let b = Stage::for_content(canvas(), &Theme::default(), "Q", &split);
    let gap_a = a.get(ElementId::AnswerLine(1)).unwrap().frame.y0
        - a.get(ElementId::AnswerLine(0)).unwrap().frame.y0;
    let gap_b = b.get(ElementId::AnswerLine(1)).unwrap().frame.y0
        - b.get(ElementId::AnswerLine(0)).unwrap().frame.y0;
    assert!(gap_b > gap_a);
}

#[test]
fn settle_offset_moves_card_to_top_slot() {
    let stage = Stage::for_content(canvas(), &Theme::default(), "Q", &[]);
    let offset = stage.question_settle_offset().unwrap();
    let card = stage.get(ElementId::QuestionCard).unwrap();
    assert!(offset.y < 0.0);
    assert!((card.frame.y0 + offset.y - 160.0).abs() < 1e-9);
}

#[test]
fn geometry_scales_with_canvas_width() {
    let small = Canvas {
        width: 540,
        height: 960,
    };
    let stage = Stage::for_content(small, &Theme::default(), "Q", &[]);
    let card = stage.get(ElementId::QuestionCard).unwrap();
    assert!((card.frame.x0 - 40.0).abs() < 1e-9);
}

#[test]
fn long_answers_stay_inside_the_answer_card() {
    let answer = (1..=24)
        .map(|i| format!("Sentence number {i} is here."))
        .collect::<Vec<_>>()
        .join(" ");
    let lines = reflow_answer(&answer);
    assert!(lines.len() >= 24);
    let stage = Stage::for_content(canvas(), &Theme::default(), "Q?", &lines);
    let card = stage.get(ElementId::AnswerCard).unwrap().frame;
    let cta = stage.get(ElementId::Cta).unwrap().frame;
    let last = stage.get(ElementId::AnswerLine(lines.len() - 1)).unwrap();
    assert!(last.frame.y1 <= card.y1 + 1e-9);
    assert!(last.frame.y1 < cta.y0);
    let ElementKind::Text { size_px, .. } = &last.kind else {
        panic!("answer line is not text");
    };
    assert!(*size_px < 56.0 && *size_px > 0.0);
}

#[test]
fn short_answers_keep_full_size() {
    let lines = reflow_answer("Just one line.");
    let stage = Stage::for_content(canvas(), &Theme::default(), "Q?", &lines);
    let line = stage.get(ElementId::AnswerLine(0)).unwrap();
    assert!((line.frame.height() - 78.0).abs() < 1e-9);
    let ElementKind::Text { size_px, .. } = &line.kind else {
        panic!("answer line is not text");
    };
    assert_eq!(*size_px, 56.0);
}
