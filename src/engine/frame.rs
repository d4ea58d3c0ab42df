use crate::error::{AnalysisError, Result};

/// Midpoint of the unsigned 8-bit time-domain scale (256 / 2).
pub const TIME_DOMAIN_MIDPOINT: u8 = 128;

pub const DEFAULT_ROLLOFF_THRESHOLD: f64 = 0.85;
pub const DEFAULT_TOP_K: usize = 10;

/// One analysis window handed over by the audio pipeline.
///
/// Borrowed for the duration of a single `process_frame` call and never
/// retained by the engine.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Byte samples centered at [`TIME_DOMAIN_MIDPOINT`]
    pub time_domain: &'a [u8],
    /// Magnitude in dB per frequency bin
    pub freq_domain: &'a [f32],
}

impl<'a> Frame<'a> {
    pub fn new(time_domain: &'a [u8], freq_domain: &'a [f32]) -> Self {
        Self {
            time_domain,
            freq_domain,
        }
    }
}

/// Frequency of bin `index` for the given sample rate and FFT size.
pub fn bin_frequency(index: usize, sample_rate: u32, fft_size: usize) -> f64 {
    FrequencyScale::new(sample_rate, fft_size).hz(index)
}

/// Bin index to Hz conversion, fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyScale {
    bin_width_hz: f64,
}

impl FrequencyScale {
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        Self {
            bin_width_hz: sample_rate as f64 / fft_size as f64,
        }
    }

    pub fn bin_width_hz(&self) -> f64 {
        self.bin_width_hz
    }

    pub fn hz(&self, index: usize) -> f64 {
        self.hz_fractional(index as f64)
    }

    /// Converts a fractional bin position (e.g. a centroid) to Hz.
    pub fn hz_fractional(&self, position: f64) -> f64 {
        position * self.bin_width_hz
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub sample_rate: u32,
    pub fft_size: usize,
    /// Expected bins per frame. `None` adopts the first frame's length.
    pub bin_count: Option<usize>,
    pub rolloff_threshold: f64,
    pub top_k: usize,
}

impl SessionConfig {
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
            bin_count: None,
            rolloff_threshold: DEFAULT_ROLLOFF_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = Some(bin_count);
        self
    }

    pub fn with_rolloff_threshold(mut self, threshold: f64) -> Self {
        self.rolloff_threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn scale(&self) -> FrequencyScale {
        FrequencyScale::new(self.sample_rate, self.fft_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::InvalidConfig("sample rate must be positive".into()));
        }
        if self.fft_size == 0 {
            return Err(AnalysisError::InvalidConfig("fft size must be positive".into()));
        }
        if self.bin_count == Some(0) {
            return Err(AnalysisError::InvalidConfig("bin count must be positive".into()));
        }
        if !(self.rolloff_threshold > 0.0 && self.rolloff_threshold <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "rolloff threshold {} outside (0, 1]",
                self.rolloff_threshold
            )));
        }
        if self.top_k == 0 {
            return Err(AnalysisError::InvalidConfig("top_k must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_width_from_rate_and_fft_size() {
        let scale = FrequencyScale::new(44100, 2048);
        assert!((scale.bin_width_hz() - 21.533203125).abs() < 1e-9);
        assert!((scale.hz(100) - 2153.3203125).abs() < 1e-9);
        assert_eq!(scale.hz(0), 0.0);
    }

    #[test]
    fn free_function_matches_scale() {
        let scale = FrequencyScale::new(48000, 1024);
        for idx in [0, 1, 17, 511] {
            assert_eq!(bin_frequency(idx, 48000, 1024), scale.hz(idx));
        }
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(SessionConfig::new(0, 2048).validate().is_err());
        assert!(SessionConfig::new(44100, 0).validate().is_err());
        assert!(SessionConfig::new(44100, 2048).with_bin_count(0).validate().is_err());
        assert!(SessionConfig::new(44100, 2048)
            .with_rolloff_threshold(0.0)
            .validate()
            .is_err());
        assert!(SessionConfig::new(44100, 2048)
            .with_rolloff_threshold(1.5)
            .validate()
            .is_err());
        assert!(SessionConfig::new(44100, 2048).with_top_k(0).validate().is_err());
        assert!(SessionConfig::new(44100, 2048).validate().is_ok());
    }
}
