use crate::encode::ffmpeg::{
    flatten_premul_over_bg_to_opaque_rgba8, flatten_straight_over_bg_to_opaque_rgba8,
};
use crate::foundation::error::ReelResult;
use crate::stage::model::Stage;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Opaque copy of the pixels composited over `bg_rgba`.
    pub fn flattened(&self, bg_rgba: [u8; 4]) -> ReelResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        if self.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut out, &self.data, bg_rgba)?;
        } else {
            flatten_straight_over_bg_to_opaque_rgba8(&mut out, &self.data, bg_rgba)?;
        }
        Ok(out)
    }
}

/// Turns the current state of a stage into pixels.
pub trait StageRenderer {
    fn render_stage(&mut self, stage: &Stage) -> ReelResult<FrameRGBA>;
}
