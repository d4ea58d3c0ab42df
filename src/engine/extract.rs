// Per-frame feature extraction. Every function here is stateless and only
// looks at the frame it is given.

use super::frame::{FrequencyScale, TIME_DOMAIN_MIDPOINT};

/// Features of a single frame. Spectral entries are `None` when the frame
/// carries no signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameFeatures {
    pub zcr: u32,
    pub centroid: Option<f64>,
    pub rolloff: Option<f64>,
}

pub fn extract(
    time_domain: &[u8],
    freq_domain: &[f32],
    rolloff_threshold: f64,
    scale: FrequencyScale,
) -> FrameFeatures {
    FrameFeatures {
        zcr: zero_crossing_rate(time_domain),
        centroid: spectral_centroid(freq_domain, scale),
        rolloff: spectral_rolloff(freq_domain, rolloff_threshold, scale),
    }
}

/// Counts sign changes of `sample - 128` across consecutive samples.
///
/// A sample exactly at the midpoint counts as "not above". The initial sign
/// is taken from the first sample.
pub fn zero_crossing_rate(time_domain: &[u8]) -> u32 {
    let Some((&first, rest)) = time_domain.split_first() else {
        return 0;
    };

    let mut above = first > TIME_DOMAIN_MIDPOINT;
    let mut crossings = 0;
    for &sample in rest {
        let is_above = sample > TIME_DOMAIN_MIDPOINT;
        if is_above != above {
            crossings += 1;
            above = is_above;
        }
    }
    crossings
}

/// Magnitude-weighted mean bin, in Hz.
///
/// Returns `None` when the total magnitude is zero; callers treat that as
/// "no centroid" and leave the frame out of the average.
pub fn spectral_centroid(freq_domain: &[f32], scale: FrequencyScale) -> Option<f64> {
    let (weighted, total) = freq_domain
        .iter()
        .enumerate()
        .fold((0.0f64, 0.0f64), |(weighted, total), (i, &mag)| {
            let mag = mag as f64;
            (weighted + mag * i as f64, total + mag)
        });

    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(scale.hz_fractional(weighted / total))
}

/// Lowest frequency at which the cumulative magnitude crosses
/// `threshold * total`.
///
/// The crossing direction follows the sign of the target: a positive target
/// is crossed when the running sum reaches it, a non-positive one (dB
/// spectra are mostly negative) when the running sum drops below it.
pub fn spectral_rolloff(freq_domain: &[f32], threshold: f64, scale: FrequencyScale) -> Option<f64> {
    let total: f64 = freq_domain.iter().map(|&m| m as f64).sum();
    if !total.is_finite() {
        return None;
    }
    let target = threshold * total;

    let mut cumulative = 0.0f64;
    for (i, &mag) in freq_domain.iter().enumerate() {
        cumulative += mag as f64;
        let crossed = if target > 0.0 {
            cumulative >= target
        } else {
            cumulative < target
        };
        if crossed {
            return Some(scale.hz(i));
        }
    }
    None
}
