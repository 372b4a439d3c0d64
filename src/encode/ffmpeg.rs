use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::platform::{CapturePlatform, EncodeSession, SampleOrder, VideoSample};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::{FrameRGBA, StageRenderer};
use crate::stage::model::Stage;

/// Encoders the WebM output needs from `ffmpeg -encoders`.
pub const REQUIRED_ENCODERS: [&str; 2] = ["libvpx-vp9", "libopus"];

#[derive(Clone, Debug)]
pub struct FfmpegWebmOpts {
    pub ffmpeg_bin: String,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// VP9 constant quality, 0..=63 (lower is better).
    pub crf: u8,
}

impl Default for FfmpegWebmOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            bg_rgba: [0, 0, 0, 255],
            crf: 32,
        }
    }
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

struct Running {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out_file: TempFileGuard,
    _audio_file: TempFileGuard,
    canvas: Canvas,
    keyframe_interval: u64,
}

/// Platform that rasterizes stages on the CPU and streams them into `ffmpeg` (VP9 + Opus, WebM).
pub struct FfmpegWebmPlatform {
    opts: FfmpegWebmOpts,
    renderer: Box<dyn StageRenderer>,
    supported: Option<bool>,
    running: Option<Running>,
    scratch: Vec<u8>,
    order: SampleOrder,
}

impl FfmpegWebmPlatform {
    pub fn new(opts: FfmpegWebmOpts, renderer: Box<dyn StageRenderer>) -> Self {
        Self {
            opts,
            renderer,
            supported: None,
            running: None,
            scratch: Vec::new(),
            order: SampleOrder::default(),
        }
    }

    fn running(&mut self) -> ReelResult<&mut Running> {
        self.running
            .as_mut()
            .ok_or_else(|| ReelError::encode("ffmpeg platform not started"))
    }

    fn teardown(&mut self) {
        if let Some(mut run) = self.running.take() {
            drop(run.stdin.take());
            let _ = run.child.kill();
            let _ = run.child.wait();
            if let Some(handle) = run.stderr_drain.take() {
                let _ = handle.join();
            }
        }
        self.order.reset();
    }
}

impl Drop for FfmpegWebmPlatform {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl CapturePlatform for FfmpegWebmPlatform {
    fn name(&self) -> &str {
        "ffmpeg-webm"
    }

    fn is_supported(&mut self) -> bool {
        if let Some(known) = self.supported {
            return known;
        }
        let ok = has_encoders(&self.opts.ffmpeg_bin, &REQUIRED_ENCODERS);
        if !ok {
            tracing::warn!(
                bin = %self.opts.ffmpeg_bin,
                "ffmpeg with libvpx-vp9 and libopus encoders was not found"
            );
        }
        self.supported = Some(ok);
        ok
    }

    fn begin(&mut self, session: &EncodeSession<'_>) -> ReelResult<()> {
        session.validate()?;
        if !session.canvas.width.is_multiple_of(2) || !session.canvas.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        self.teardown();

        let mut audio_file = TempFileGuard(None);
        let audio_path = match session.audio {
            Some(pcm) => {
                let path = temp_path("reelsynth_audio", "f32le");
                pcm.write_f32le(&path)?;
                audio_file.0 = Some(path.clone());
                Some(path)
            }
            None => None,
        };
        let out_path = temp_path("reelsynth_video", "webm");
        let out_file = TempFileGuard(Some(out_path.clone()));

        let args = build_ffmpeg_args(session, &self.opts, audio_path.as_deref(), &out_path);
        tracing::debug!(?args, "spawning ffmpeg");
        let mut child = Command::new(&self.opts.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::config(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.opts.ffmpeg_bin
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; session.canvas.bytes_rgba8()];
        self.order.reset();
        self.running = Some(Running {
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            out_file,
            _audio_file: audio_file,
            canvas: session.canvas,
            keyframe_interval: session.keyframe_interval,
        });
        Ok(())
    }

    fn capture_frame(&mut self, stage: &Stage) -> ReelResult<FrameRGBA> {
        let canvas = self.running()?.canvas;
        if stage.canvas() != canvas {
            return Err(ReelError::validation(format!(
                "stage is {}x{} but the encoder expects {}x{}",
                stage.canvas().width,
                stage.canvas().height,
                canvas.width,
                canvas.height
            )));
        }
        self.renderer.render_stage(stage)
    }

    fn encode_frame(&mut self, frame: &FrameRGBA, sample: VideoSample) -> ReelResult<()> {
        self.order.check(sample)?;
        let bg = self.opts.bg_rgba;
        let run = self
            .running
            .as_mut()
            .ok_or_else(|| ReelError::encode("ffmpeg platform not started"))?;
        if sample.is_keyframe != sample.index.0.is_multiple_of(run.keyframe_interval) {
            return Err(ReelError::validation(format!(
                "keyframe flag of sample {} disagrees with interval {}",
                sample.index.0, run.keyframe_interval
            )));
        }
        if frame.width != run.canvas.width || frame.height != run.canvas.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, run.canvas.width, run.canvas.height
            )));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, bg)?;
        } else {
            flatten_straight_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, bg)?;
        }
        let stdin = run
            .stdin
            .as_mut()
            .ok_or_else(|| ReelError::encode("ffmpeg platform is already finalized"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        if sample.is_keyframe {
            tracing::debug!(frame = sample.index.0, "keyframe submitted");
        }
        Ok(())
    }

    fn finalize(&mut self) -> ReelResult<Vec<u8>> {
        let mut run = self
            .running
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg platform not started"))?;
        drop(run.stdin.take());

        let status = run
            .child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match run.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let out_path = run
            .out_file
            .0
            .as_deref()
            .ok_or_else(|| ReelError::encode("ffmpeg output path missing"))?;
        let bytes = std::fs::read(out_path).map_err(|e| {
            ReelError::encode(format!(
                "failed to read encoded output '{}': {e}",
                out_path.display()
            ))
        })?;
        self.order.reset();
        Ok(bytes)
    }

    fn abort(&mut self) {
        self.teardown();
    }
}

/// Command line for one WebM encode.
pub fn build_ffmpeg_args(
    session: &EncodeSession<'_>,
    opts: &FfmpegWebmOpts,
    audio_path: Option<&Path>,
    out_path: &Path,
) -> Vec<String> {
    let k = session.keyframe_interval.to_string();
    let mut args: Vec<String> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", session.canvas.width, session.canvas.height),
        "-r",
        &format!("{}/{}", session.fps.num, session.fps.den),
        "-i",
        "pipe:0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if let (Some(path), Some(pcm)) = (audio_path, session.audio) {
        args.extend(
            [
                "-f",
                "f32le",
                "-ar",
                &pcm.sample_rate.to_string(),
                "-ac",
                &pcm.channels.to_string(),
                "-i",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(path.display().to_string());
    }

    args.extend(
        [
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            "0",
            "-crf",
            &opts.crf.min(63).to_string(),
            "-row-mt",
            "1",
            "-g",
            &k,
            "-keyint_min",
            &k,
            "-force_key_frames",
            &format!("expr:eq(mod(n,{k}),0)"),
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    if audio_path.is_some() && session.audio.is_some() {
        args.extend(["-c:a", "libopus", "-b:a", "128k"].iter().map(|s| s.to_string()));
    } else {
        args.push("-an".to_string());
    }
    args.extend(["-f", "webm"].iter().map(|s| s.to_string()));
    args.push(out_path.display().to_string());
    args
}

/// Whether `ffmpeg_bin -encoders` lists every name in `encoders`.
pub fn has_encoders(ffmpeg_bin: &str, encoders: &[&str]) -> bool {
    let Ok(out) = Command::new(ffmpeg_bin)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    if !out.status.success() {
        return false;
    }
    let listing = String::from_utf8_lossy(&out.stdout);
    encoders_listed(&listing, encoders)
}

pub(crate) fn encoders_listed(listing: &str, encoders: &[&str]) -> bool {
    encoders.iter().all(|name| {
        listing
            .lines()
            .any(|line| line.split_whitespace().nth(1) == Some(*name))
    })
}

/// Return `true` when `ffmpeg_bin` can be invoked.
pub fn is_ffmpeg_on_path(ffmpeg_bin: &str) -> bool {
    Command::new(ffmpeg_bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{ext}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

pub(crate) fn flatten_straight_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(u16::from(bg_rgba[c]), inv))
                .min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
