use crate::encode::platform::{CapturePlatform, ContainerSpec};
use crate::foundation::error::{ReelError, ReelResult};

/// Finished, immutable video file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoBlob {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl VideoBlob {
    pub fn new(bytes: Vec<u8>, mime_type: &'static str) -> Self {
        Self { bytes, mime_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the blob to `path`, creating parent directories.
    pub fn write_to(&self, path: &std::path::Path) -> ReelResult<()> {
        use anyhow::Context as _;
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write video '{}'", path.display()))?;
        Ok(())
    }
}

/// Finalize the platform's container into a typed blob.
///
/// An empty container is an encode error; on any failure the platform is aborted so no partial
/// output survives.
pub fn finalize_blob(platform: &mut dyn CapturePlatform, spec: &ContainerSpec) -> ReelResult<VideoBlob> {
    match platform.finalize() {
        Ok(bytes) if bytes.is_empty() => {
            platform.abort();
            Err(ReelError::encode(format!(
                "{} produced an empty container",
                platform.name()
            )))
        }
        Ok(bytes) => Ok(VideoBlob::new(bytes, spec.mime_type)),
        Err(e) => {
            platform.abort();
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
