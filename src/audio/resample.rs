use crate::audio::media::AudioPcm;

/// Resample `pcm` to `target_rate` by linear interpolation, keeping the channel layout.
///
/// The whole buffer is converted in one pass; there is no streaming state.
pub fn resample_linear(pcm: &AudioPcm, target_rate: u32) -> AudioPcm {
    let channels = usize::from(pcm.channels);
    let src_frames = pcm.frames();
    if pcm.sample_rate == target_rate || src_frames == 0 || channels == 0 || pcm.sample_rate == 0
    {
        return AudioPcm {
            sample_rate: target_rate,
            channels: pcm.channels,
            interleaved_f32: pcm.interleaved_f32.clone(),
        };
    }

    let src_rate = u128::from(pcm.sample_rate);
    let dst_frames =
        ((src_frames as u128 * u128::from(target_rate)).div_ceil(src_rate)) as usize;
    let step = f64::from(pcm.sample_rate) / f64::from(target_rate);
    let src = &pcm.interleaved_f32;
    let mut out = Vec::with_capacity(dst_frames * channels);

    for dst in 0..dst_frames {
        let src_pos = dst as f64 * step;
        let src_frame0 = (src_pos.floor() as usize).min(src_frames - 1);
        let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
        let frac = (src_pos - src_frame0 as f64).clamp(0.0, 1.0) as f32;
        let i0 = src_frame0 * channels;
        let i1 = src_frame1 * channels;
        for ch in 0..channels {
            let v0 = src[i0 + ch];
            let v1 = src[i1 + ch];
            out.push(v0 + ((v1 - v0) * frac));
        }
    }

    AudioPcm {
        sample_rate: target_rate,
        channels: pcm.channels,
        interleaved_f32: out,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/resample.rs"]
mod tests;
