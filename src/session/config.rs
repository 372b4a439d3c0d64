use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encode::platform::ContainerSpec;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::stage::layout::Theme;

/// Render settings, loadable from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Frames between forced keyframes.
    pub keyframe_interval: u64,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
    /// Volume used when neither the request nor the track sets one.
    pub default_volume: f64,
    /// Color transparent pixels are flattened onto before encoding.
    pub bg_rgba: [u8; 4],
    pub theme: Theme,
    /// Font for the CPU rasterizer.
    pub font_path: Option<PathBuf>,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    /// VP9 constant-quality factor.
    pub crf: u8,
}

/// Values given on the command line that win over the config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub font_path: Option<PathBuf>,
    pub ffmpeg_bin: Option<String>,
    pub ffprobe_bin: Option<String>,
    pub fps: Option<Fps>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut RenderConfig) {
        if let Some(font) = &self.font_path {
            cfg.font_path = Some(font.clone());
        }
        if let Some(bin) = &self.ffmpeg_bin {
            cfg.ffmpeg_bin = bin.clone();
        }
        if let Some(bin) = &self.ffprobe_bin {
            cfg.ffprobe_bin = bin.clone();
        }
        if let Some(fps) = self.fps {
            cfg.fps = fps;
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let spec = ContainerSpec::WEBM_VERTICAL;
        Self {
            canvas: spec.canvas(),
            fps: spec.fps,
            keyframe_interval: 48,
            audio_sample_rate: spec.audio_sample_rate,
            audio_channels: spec.audio_channels,
            default_volume: 0.5,
            bg_rgba: [0, 0, 0, 255],
            theme: Theme::default(),
            font_path: None,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            crf: 32,
        }
    }
}

impl RenderConfig {
    pub fn from_reader(reader: impl std::io::Read) -> ReelResult<Self> {
        let cfg = Self::parse_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        Self::load(Some(path.as_ref()), &ConfigOverrides::default())
    }

    /// Read `path` (or start from defaults), apply `overrides`, then validate the result.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> ReelResult<Self> {
        let mut cfg = match path {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("open render config '{}'", path.display()))?;
                Self::parse_reader(std::io::BufReader::new(file))?
            }
            None => Self::default(),
        };
        overrides.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn parse_reader(reader: impl std::io::Read) -> ReelResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| ReelError::serde(format!("render config: {e}")))
    }

    pub fn validate(&self) -> ReelResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(ReelError::config("canvas width/height must be > 0"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::config("canvas width/height must be even"));
        }
        if u64::from(width) * 16 != u64::from(height) * 9 {
            return Err(ReelError::config(format!(
                "canvas must be 9:16 portrait, got {width}x{height}"
            )));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ReelError::config("fps must be > 0"));
        }
        if self.keyframe_interval == 0 {
            return Err(ReelError::config("keyframe_interval must be > 0"));
        }
        let spec = ContainerSpec::WEBM_VERTICAL;
        if self.audio_sample_rate != spec.audio_sample_rate {
            return Err(ReelError::config(format!(
                "audio_sample_rate must be {}",
                spec.audio_sample_rate
            )));
        }
        if self.audio_channels != spec.audio_channels {
            return Err(ReelError::config(format!(
                "audio_channels must be {}",
                spec.audio_channels
            )));
        }
        if !self.default_volume.is_finite() || self.default_volume < 0.0 {
            return Err(ReelError::config("default_volume must be finite and >= 0"));
        }
        if self.ffmpeg_bin.trim().is_empty() || self.ffprobe_bin.trim().is_empty() {
            return Err(ReelError::config("ffmpeg_bin/ffprobe_bin must be non-empty"));
        }
        Ok(())
    }

    /// Output format for this configuration.
    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
            ..ContainerSpec::WEBM_VERTICAL
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
