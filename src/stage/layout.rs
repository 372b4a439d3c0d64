use crate::foundation::core::{Canvas, Rect, Rgba8, Vec2};
use crate::stage::model::{Element, ElementId, ElementKind, ElementState, Stage, TextAlign};
use crate::text::reflow::{AnswerLine, WRAP_COLUMNS, wrap_words};

/// Colours and copy for the stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Rgba8,
    pub card: Rgba8,
    pub question_text: Rgba8,
    pub answer_text: Rgba8,
    pub accent: Rgba8,
    pub cta_text: Rgba8,
    pub cta_label: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba8::new(17, 19, 31, 255),
            card: Rgba8::new(35, 39, 61, 235),
            question_text: Rgba8::new(255, 255, 255, 255),
            answer_text: Rgba8::new(230, 233, 245, 255),
            accent: Rgba8::new(255, 176, 46, 255),
            cta_text: Rgba8::new(17, 19, 31, 255),
            cta_label: "Follow for more".to_string(),
        }
    }
}

// Geometry is expressed for a 1080-wide canvas and scaled to the actual width.
const MARGIN_X: f64 = 80.0;
const CARD_PADDING: f64 = 64.0;
const CARD_RADIUS: f64 = 48.0;
const QUESTION_SIZE_PX: f64 = 68.0;
const QUESTION_LINE_HEIGHT: f64 = 92.0;
const QUESTION_TOP_Y: f64 = 160.0;
const ANSWER_SIZE_PX: f64 = 56.0;
const ANSWER_LINE_HEIGHT: f64 = 78.0;
const LINE_BREAK_GAP: f64 = 24.0;
const PARAGRAPH_GAP: f64 = 48.0;
const ANSWER_GAP: f64 = 56.0;
const CTA_HEIGHT: f64 = 128.0;
const CTA_BOTTOM_MARGIN: f64 = 220.0;
const CTA_SIZE_PX: f64 = 52.0;

/// Vertical offset lines and the call-to-action rise from.
pub const REVEAL_RISE_PX: f64 = 40.0;
/// Scale answer lines pop in from.
pub const REVEAL_START_SCALE: f64 = 0.9;

impl Stage {
    /// Lay out the standard question/answer stage.
    ///
    /// The question card starts vertically centred; the answer block sits below where the card
    /// settles after the transition.
    pub fn for_content(
        canvas: Canvas,
        theme: &Theme,
        question: &str,
        answer_lines: &[AnswerLine],
    ) -> Self {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let k = w / 1080.0;
        let mut stage = Stage::new(canvas);

        stage.insert(Element::new(
            ElementId::Background,
            ElementKind::Fill {
                color: theme.background,
                corner_radius: 0.0,
            },
            Rect::new(0.0, 0.0, w, h),
            ElementState::default(),
        ));

        let q_lines = wrap_words(question, WRAP_COLUMNS).len().max(1) as f64;
        let card_w = w - 2.0 * MARGIN_X * k;
        let card_h = q_lines * QUESTION_LINE_HEIGHT * k + 2.0 * CARD_PADDING * k;
        let card_y = (h - card_h) / 2.0;
        let card = Rect::new(MARGIN_X * k, card_y, MARGIN_X * k + card_w, card_y + card_h);
        stage.insert(Element::new(
            ElementId::QuestionCard,
            ElementKind::Fill {
                color: theme.card,
                corner_radius: CARD_RADIUS * k,
            },
            card,
            ElementState::default(),
        ));
        stage.insert(Element::new(
            ElementId::QuestionText,
            ElementKind::Text {
                text: question.split_whitespace().collect::<Vec<_>>().join(" "),
                size_px: (QUESTION_SIZE_PX * k) as f32,
                color: theme.question_text,
                align: TextAlign::Start,
            },
            Rect::new(
                card.x0 + CARD_PADDING * k,
                card.y0 + CARD_PADDING * k,
                card.x1 - CARD_PADDING * k,
                card.y1 - CARD_PADDING * k,
            ),
            ElementState {
                visible_chars: Some(0),
                ..ElementState::default()
            },
        ));

        let answer_top = QUESTION_TOP_Y * k + card_h + ANSWER_GAP * k;
        let cta_top = h - (CTA_BOTTOM_MARGIN + CTA_HEIGHT) * k;
        let answer_card = Rect::new(
            MARGIN_X * k,
            answer_top,
            w - MARGIN_X * k,
            (cta_top - ANSWER_GAP * k).max(answer_top),
        );
        stage.insert(Element::new(
            ElementId::AnswerCard,
            ElementKind::Fill {
                color: theme.card,
                corner_radius: CARD_RADIUS * k,
            },
            answer_card,
            ElementState {
                opacity: 0.0,
                ..ElementState::default()
            },
        ));

        // Long answers are shrunk uniformly so the block stays inside the answer card.
        let natural: f64 = answer_lines
            .iter()
            .map(|l| answer_line_gap(l) + ANSWER_LINE_HEIGHT)
            .sum::<f64>()
            * k;
        let room = (answer_card.height() - 2.0 * CARD_PADDING * k).max(0.0);
        let fit = if natural > room && room > 0.0 {
            room / natural
        } else {
            1.0
        };

        let mut y = answer_top + CARD_PADDING * k;
        for (i, line) in answer_lines.iter().enumerate() {
            y += answer_line_gap(line) * k * fit;
            let line_h = ANSWER_LINE_HEIGHT * k * fit;
            stage.insert(Element::new(
                ElementId::AnswerLine(i),
                ElementKind::Text {
                    text: line.text.clone(),
                    size_px: (ANSWER_SIZE_PX * k * fit) as f32,
                    color: theme.answer_text,
                    align: TextAlign::Start,
                },
                Rect::new(
                    (MARGIN_X + CARD_PADDING) * k,
                    y,
                    w - (MARGIN_X + CARD_PADDING) * k,
                    y + line_h,
                ),
                ElementState {
                    opacity: 0.0,
                    translate: Vec2::new(0.0, REVEAL_RISE_PX * k),
                    scale: REVEAL_START_SCALE,
                    visible_chars: None,
                },
            ));
            y += line_h;
        }

        let cta = Rect::new(
            MARGIN_X * 2.0 * k,
            cta_top,
            w - MARGIN_X * 2.0 * k,
            cta_top + CTA_HEIGHT * k,
        );
        stage.insert(Element::new(
            ElementId::Cta,
            ElementKind::Button {
                color: theme.accent,
                corner_radius: CTA_HEIGHT * k / 2.0,
                label: theme.cta_label.clone(),
                size_px: (CTA_SIZE_PX * k) as f32,
                label_color: theme.cta_text,
            },
            cta,
            ElementState {
                opacity: 0.0,
                translate: Vec2::new(0.0, REVEAL_RISE_PX * k),
                ..ElementState::default()
            },
        ));
        stage
    }

    /// Offset that moves the question card from its centred position to the top slot.
    pub fn question_settle_offset(&self) -> Option<Vec2> {
        let card = self.get(ElementId::QuestionCard)?;
        let k = f64::from(self.canvas().width) / 1080.0;
        Some(Vec2::new(0.0, QUESTION_TOP_Y * k - card.frame.y0))
    }
}

/// Extra space above an answer line, before scaling.
fn answer_line_gap(line: &AnswerLine) -> f64 {
    if line.is_new_paragraph {
        PARAGRAPH_GAP
    } else if line.is_after_line_break {
        LINE_BREAK_GAP
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/layout.rs"]
mod tests;
