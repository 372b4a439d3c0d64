//! Reelsynth turns a question/answer pair into a short vertical video.
//!
//! Everything a render derives from its content (typing rhythm, answer layout, phase timing and
//! the background track) is a pure function of the pair, so the same input always yields the
//! same frames. The public surface is plan-then-render:
//!
//! - Build a [`RenderPlan`] from a [`ContentPair`]
//! - Lay out its [`Stage`] and drive it with a [`Timeline`] (interactively via [`PreviewLoop`])
//! - [`render`] every frame into a [`CapturePlatform`] and take the finished [`VideoBlob`]
#![forbid(unsafe_code)]

mod foundation;

/// Phase timeline, easing and preview playback.
pub mod animation;
/// Background track catalog, selection and PCM preparation.
pub mod audio;
pub(crate) mod content;
/// Capture platforms and the output muxer.
pub mod encode;
/// Stage rasterization.
pub mod render;
/// Render configuration, planning and the frame loop.
pub mod session;
/// Element model and layout of the video's scene.
pub mod stage;
pub(crate) mod text;
pub(crate) mod timing;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{ErrorClass, ReelError, ReelResult};
pub use crate::foundation::prng::SeededRng;

pub use crate::content::pair::ContentPair;
pub use crate::text::reflow::{AnswerLine, WRAP_COLUMNS, reflow_answer};
pub use crate::text::typing::{RevealSchedule, generate_typing_intervals, typewriter_total_secs};
pub use crate::timing::duration::{DurationEstimate, estimate_duration, question_line_count};

pub use crate::animation::ease::Ease;
pub use crate::animation::preview::{Clock, ManualClock, PreviewLoop, PreviewTick, SystemClock};
pub use crate::animation::timeline::{PhaseKind, Timeline};
pub use crate::stage::layout::Theme;
pub use crate::stage::model::{Element, ElementId, ElementKind, ElementState, Stage, TextAlign};

pub use crate::audio::catalog::{AudioCatalog, AudioTrack};
pub use crate::audio::media::AudioPcm;
pub use crate::audio::prepare::{
    AudioDecoder, FfmpegAudioDecoder, MIX_SAMPLE_RATE, PcmBuffer, extract_window, prepare_audio,
};
pub use crate::audio::resample::resample_linear;
pub use crate::audio::select::{AudioSelection, select_track};

pub use crate::encode::ffmpeg::{FfmpegWebmOpts, FfmpegWebmPlatform};
pub use crate::encode::memory::{InMemoryPlatform, MemoryContainer, PlatformEvent};
pub use crate::encode::mux::{VideoBlob, finalize_blob};
pub use crate::encode::platform::{CapturePlatform, ContainerSpec, EncodeSession, VideoSample};
pub use crate::render::backend::{FrameRGBA, StageRenderer};
pub use crate::render::raster::{CpuRasterizer, load_font};

pub use crate::session::config::{ConfigOverrides, RenderConfig};
pub use crate::session::pipeline::{
    CancelFlag, RenderOutput, RenderProgress, RenderRequest, RenderStats, render,
};
pub use crate::session::plan::{PlanOverrides, RenderPlan};
