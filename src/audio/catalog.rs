use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// One entry of the read-only background music catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    pub duration_seconds: f64,
    /// File path or URL understood by the decoder.
    #[serde(alias = "url")]
    pub source_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(alias = "volume", default)]
    pub default_volume: Option<f64>,
}

/// Candidate tracks in catalog order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AudioCatalog {
    pub tracks: Vec<AudioTrack>,
}

impl AudioCatalog {
    pub fn new(tracks: Vec<AudioTrack>) -> Self {
        Self { tracks }
    }

    pub fn from_reader(reader: impl std::io::Read) -> ReelResult<Self> {
        let catalog: Self = serde_json::from_reader(reader)
            .map_err(|e| ReelError::serde(format!("audio catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open audio catalog '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn validate(&self) -> ReelResult<()> {
        for t in &self.tracks {
            if t.id.trim().is_empty() {
                return Err(ReelError::validation("audio track id must be non-empty"));
            }
            if !t.duration_seconds.is_finite() || t.duration_seconds < 0.0 {
                return Err(ReelError::validation(format!(
                    "audio track '{}' has invalid duration",
                    t.id
                )));
            }
            if let Some(v) = t.default_volume
                && (!v.is_finite() || v < 0.0)
            {
                return Err(ReelError::validation(format!(
                    "audio track '{}' volume must be finite and >= 0",
                    t.id
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}

impl AudioTrack {
    /// Local path of the source, resolving relative paths against `base`.
    pub fn source_path(&self, base: Option<&Path>) -> PathBuf {
        let raw = self
            .source_url
            .strip_prefix("file://")
            .unwrap_or(&self.source_url);
        let p = PathBuf::from(raw);
        match base {
            Some(base) if p.is_relative() && !raw.contains("://") => base.join(p),
            _ => p,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/catalog.rs"]
mod tests;
