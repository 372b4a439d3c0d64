use super::*;
use crate::foundation::core::Vec2;
use crate::stage::model::{ElementId, ElementState};

fn fill_stage() -> Stage {
    let mut stage = Stage::new(Canvas {
        width: 64,
        height: 32,
    });
    stage.insert(Element::new(
        ElementId::Background,
        ElementKind::Fill {
            color: Rgba8::new(0, 0, 255, 255),
            corner_radius: 0.0,
        },
        Rect::new(0.0, 0.0, 64.0, 32.0),
        ElementState::default(),
    ));
    stage.insert(Element::new(
        ElementId::QuestionCard,
        ElementKind::Fill {
            color: Rgba8::new(255, 0, 0, 255),
            corner_radius: 4.0,
        },
        Rect::new(8.0, 8.0, 24.0, 24.0),
        ElementState::default(),
    ));
    stage
}

#[test]
fn fills_draw_in_stage_order() {
    let mut r = CpuRasterizer::new(None).unwrap();
    let frame = r.render_stage(&fill_stage()).unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    assert_eq!(frame.data.len(), 64 * 32 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(16, 16), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(50, 16), Some([0, 0, 255, 255]));
}

#[test]
fn translate_moves_element() {
    let mut stage = fill_stage();
    stage.get_mut(ElementId::QuestionCard).unwrap().state.translate = Vec2::new(30.0, 0.0);
    let mut r = CpuRasterizer::new(None).unwrap();
    let frame = r.render_stage(&stage).unwrap();
    assert_eq!(frame.pixel(16, 16), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(46, 16), Some([255, 0, 0, 255]));
}

#[test]
fn transparent_elements_are_skipped() {
    let mut stage = fill_stage();
    stage.get_mut(ElementId::QuestionCard).unwrap().state.opacity = 0.0;
    let mut r = CpuRasterizer::new(None).unwrap();
    let frame = r.render_stage(&stage).unwrap();
    assert_eq!(frame.pixel(16, 16), Some([0, 0, 255, 255]));
}

#[test]
fn text_without_font_is_a_config_error() {
    let mut stage = fill_stage();
    stage.insert(Element::new(
        ElementId::QuestionText,
        ElementKind::Text {
            text: "hello".to_string(),
            size_px: 12.0,
            color: Rgba8::new(255, 255, 255, 255),
            align: TextAlign::Start,
        },
        Rect::new(0.0, 0.0, 64.0, 16.0),
        ElementState::default(),
    ));
    let mut r = CpuRasterizer::new(None).unwrap();
    let err = r.render_stage(&stage).unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn visible_prefix_counts_chars_not_bytes() {
    assert_eq!(visible_prefix("héllo", Some(2)), "hé");
    assert_eq!(visible_prefix("héllo", Some(0)), "");
    assert_eq!(visible_prefix("héllo", Some(99)), "héllo");
    assert_eq!(visible_prefix("héllo", None), "héllo");
}

#[test]
fn scale_is_about_the_box_centre() {
    let mut el = fill_stage().get(ElementId::QuestionCard).unwrap().clone();
    el.state.scale = 2.0;
    let t = element_transform(&el);
    let c = t * kurbo::Point::new(16.0, 16.0);
    assert!((c.x - 16.0).abs() < 1e-9 && (c.y - 16.0).abs() < 1e-9);
    let corner = t * kurbo::Point::new(8.0, 8.0);
    assert!((corner.x - 0.0).abs() < 1e-9);
}

#[test]
fn oversized_canvas_is_rejected() {
    let stage = Stage::new(Canvas {
        width: 70_000,
        height: 10,
    });
    let mut r = CpuRasterizer::new(None).unwrap();
    assert!(r.render_stage(&stage).is_err());
}

#[test]
fn load_font_without_path_is_none() {
    assert!(load_font(None).unwrap().is_none());
    assert!(load_font(Some(Path::new("/definitely/missing.ttf"))).is_err());
}
