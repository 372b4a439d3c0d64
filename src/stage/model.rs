use std::collections::BTreeMap;

use crate::foundation::core::{Canvas, Rect, Rgba8, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;

/// Addressable visual elements of a stage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ElementId {
    Background,
    QuestionCard,
    QuestionText,
    AnswerCard,
    AnswerLine(usize),
    Cta,
}

/// Animatable state of one element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ElementState {
    pub opacity: f64,
    pub translate: Vec2,
    pub scale: f64,
    /// Characters shown for typewriter text; `None` shows everything.
    pub visible_chars: Option<usize>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: Vec2::ZERO,
            scale: 1.0,
            visible_chars: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    Start,
    Center,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ElementKind {
    Fill {
        color: Rgba8,
        corner_radius: f64,
    },
    Text {
        text: String,
        size_px: f32,
        color: Rgba8,
        align: TextAlign,
    },
    Button {
        color: Rgba8,
        corner_radius: f64,
        label: String,
        size_px: f32,
        label_color: Rgba8,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Layout box in canvas pixels before any animated transform.
    pub frame: Rect,
    /// State every seek starts from.
    pub baseline: ElementState,
    pub state: ElementState,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, frame: Rect, baseline: ElementState) -> Self {
        Self {
            id,
            kind,
            frame,
            baseline,
            state: baseline,
        }
    }

    /// Whether drawing this element would produce any pixels.
    pub fn is_visible(&self) -> bool {
        self.state.opacity > 0.0 && self.state.scale > 0.0 && self.state.visible_chars != Some(0)
    }
}

/// The render target: the element tree captured frame by frame.
///
/// A stage is mutated in place by every timeline seek, so exactly one preview or render may
/// drive it at a time; both take it by `&mut`.
#[derive(Clone, Debug)]
pub struct Stage {
    canvas: Canvas,
    elements: Vec<Element>,
    index: BTreeMap<ElementId, usize>,
    generation: u64,
}

impl Stage {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            elements: Vec::new(),
            index: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Add an element on top of the existing ones, replacing any element with the same id.
    pub fn insert(&mut self, element: Element) {
        match self.index.get(&element.id) {
            Some(&i) => self.elements[i] = element,
            None => {
                self.index.insert(element.id, self.elements.len());
                self.elements.push(element);
            }
        }
    }

    /// Remove an element. Returns it when it existed.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let i = self.index.remove(&id)?;
        let removed = self.elements.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.index.get(&id).map(|&i| &self.elements[i])
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.index.get(&id).map(|&i| &mut self.elements[i])
    }

    /// Elements in draw order (back to front).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Fail when any of `required` is missing.
    pub fn resolve(&self, required: &[ElementId]) -> ReelResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|id| !self.index.contains_key(id))
            .map(|id| format!("{id:?}"))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReelError::config(format!(
                "render target is missing required elements: {}",
                missing.join(", ")
            )))
        }
    }

    /// Restore every element to its baseline state.
    pub fn reset_to_baseline(&mut self) {
        for el in &mut self.elements {
            el.state = el.baseline;
        }
    }

    /// Render-commit tick: marks the current state as settled for capture.
    pub fn commit(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hash of every element's current visual state.
    pub fn state_fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        for el in &self.elements {
            let s = &el.state;
            h.write_f64(s.opacity);
            h.write_f64(s.translate.x);
            h.write_f64(s.translate.y);
            h.write_f64(s.scale);
            h.write_u64(s.visible_chars.map_or(u64::MAX, |n| n as u64));
        }
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/model.rs"]
mod tests;
