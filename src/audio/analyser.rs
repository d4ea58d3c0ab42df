use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::engine::Frame;

pub const DEFAULT_FFT_SIZE: usize = 2048;
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// Magnitudes below this floor are reported as -200 dB
const MIN_MAGNITUDE: f32 = 1e-10;

/// Produces analysis frames from PCM the way a browser analyser node does:
/// byte time-domain data around 128 and smoothed dB magnitudes per bin.
///
/// Keeps its output buffers between calls, so each frame borrows from the
/// analyser and is only valid until the next call.
pub struct Analyser {
    fft_size: usize,
    smoothing: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    time_domain: Vec<u8>,
    freq_domain: Vec<f32>,
}

impl Analyser {
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let bins = fft_size / 2;
        Self {
            fft_size,
            smoothing: smoothing.clamp(0.0, 1.0),
            fft,
            window: blackman_window(fft_size),
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            time_domain: vec![0; fft_size],
            freq_domain: vec![0.0; bins],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Analyses the `fft_size` samples that end at `end`. History before the
    /// start of `samples` reads as silence.
    pub fn analyse(&mut self, samples: &[f32], end: usize) -> Frame<'_> {
        let end = end.min(samples.len());
        let start = end.saturating_sub(self.fft_size);
        let history = &samples[start..end];
        let pad = self.fft_size - history.len();

        for i in 0..self.fft_size {
            let x = if i < pad { 0.0 } else { history[i - pad] };
            self.time_domain[i] = (128.0 * (1.0 + x)).clamp(0.0, 255.0) as u8;
            self.scratch[i] = Complex::new(x * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let norm = 1.0 / self.fft_size as f32;
        let tau = self.smoothing;
        for (k, bin) in self.scratch[..self.fft_size / 2].iter().enumerate() {
            let magnitude = bin.norm() * norm;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            self.freq_domain[k] = 20.0 * self.smoothed[k].max(MIN_MAGNITUDE).log10();
        }

        Frame::new(&self.time_domain, &self.freq_domain)
    }
}

/// Buffer boundaries at which frames are taken: one per `buffer_size`
/// samples of `[start, end)`, each tick marking the end of a full buffer.
pub fn ticks(start: usize, end: usize, buffer_size: usize) -> impl Iterator<Item = usize> {
    let step = buffer_size.max(1);
    (start + step..=end).step_by(step)
}

/// Blackman window with alpha = 0.16.
fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42f32;
    let a1 = 0.5f32;
    let a2 = 0.08f32;
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}
