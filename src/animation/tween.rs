use crate::foundation::core::Vec2;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Start and end value of one animated property.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    /// Value at already-eased progress `t`. Overshooting eases may pass `t > 1`.
    pub fn sample(&self, t: f64) -> T {
        T::lerp(&self.from, &self.to, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
