use crate::audio::catalog::{AudioCatalog, AudioTrack};
use crate::foundation::prng::SeededRng;

/// Tracks must outlast the video by this much to be preferred.
pub const SELECTION_HEADROOM_SECS: f64 = 5.0;
/// Appended to the content seed for the start-offset draw.
pub const OFFSET_SEED_SUFFIX: &str = "-offset";

/// The track a render plays, where in it to start, and how loud.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioSelection {
    pub track: AudioTrack,
    pub start_secs: f64,
    pub volume: f64,
}

/// Pick a track and start offset for content with `seed`.
///
/// Tracks shorter than `required_secs + 5` are skipped unless every track is; then the whole
/// catalog is used. Returns `None` only for an empty catalog.
#[tracing::instrument(level = "debug", skip(catalog), fields(candidates = catalog.len()))]
pub fn select_track(
    catalog: &AudioCatalog,
    required_secs: f64,
    seed: &str,
    default_volume: f64,
) -> Option<AudioSelection> {
    if catalog.is_empty() {
        tracing::warn!("audio catalog is empty; rendering without audio");
        return None;
    }

    let min_len = required_secs + SELECTION_HEADROOM_SECS;
    let long_enough: Vec<&AudioTrack> = catalog
        .tracks
        .iter()
        .filter(|t| t.duration_seconds >= min_len)
        .collect();
    let pool: Vec<&AudioTrack> = if long_enough.is_empty() {
        tracing::warn!(
            required_secs,
            "no audio track is at least {min_len:.1}s long; choosing from all tracks"
        );
        catalog.tracks.iter().collect()
    } else {
        long_enough
    };

    let track = pool[SeededRng::from_seed(seed).index(pool.len())];
    let mut offset_rng = SeededRng::from_seed(&format!("{seed}{OFFSET_SEED_SUFFIX}"));
    let room = (track.duration_seconds - required_secs - SELECTION_HEADROOM_SECS).max(0.0);
    let start_secs = (offset_rng.next_f64() * room).floor();

    Some(AudioSelection {
        volume: track.default_volume.unwrap_or(default_volume),
        track: track.clone(),
        start_secs,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/select.rs"]
mod tests;
