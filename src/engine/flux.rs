use crate::error::{AnalysisError, Domain, Result};

/// Flux history of a single frequency bin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxBinState {
    previous_magnitude: Option<f32>,
    deltas: Vec<f32>,
}

impl FluxBinState {
    pub fn previous_magnitude(&self) -> Option<f32> {
        self.previous_magnitude
    }

    /// One delta per recorded frame. The first entry is always `0.0`.
    pub fn deltas(&self) -> &[f32] {
        &self.deltas
    }

    fn push(&mut self, magnitude: f32) {
        let delta = match self.previous_magnitude {
            Some(prev) => (magnitude - prev).abs(),
            None => 0.0,
        };
        self.deltas.push(delta);
        self.previous_magnitude = Some(magnitude);
    }
}

/// Tracks per-bin spectral flux across consecutive frames.
///
/// The first recorded frame appends a `0.0` delta to every bin: there is no
/// previous frame to compare against, so early samples read as "no flux yet"
/// rather than as a measurement.
#[derive(Clone, Debug, Default)]
pub struct FluxTracker {
    bins: Vec<FluxBinState>,
    frames: usize,
}

impl FluxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the tracker instead of adopting the first frame's length.
    pub fn with_bin_count(bin_count: usize) -> Self {
        Self {
            bins: vec![FluxBinState::default(); bin_count],
            frames: 0,
        }
    }

    pub fn record(&mut self, freq_domain: &[f32]) -> Result<()> {
        if self.frames == 0 && self.bins.is_empty() {
            self.bins = vec![FluxBinState::default(); freq_domain.len()];
        }
        if freq_domain.len() != self.bins.len() {
            return Err(AnalysisError::DimensionMismatch {
                frame: self.frames,
                domain: Domain::Frequency,
                expected: self.bins.len(),
                actual: freq_domain.len(),
            });
        }

        for (state, &magnitude) in self.bins.iter_mut().zip(freq_domain) {
            state.push(magnitude);
        }
        self.frames += 1;
        Ok(())
    }

    /// Number of bins, or `None` before the first frame when not pre-sized.
    pub fn bin_count(&self) -> Option<usize> {
        if self.frames == 0 && self.bins.is_empty() {
            None
        } else {
            Some(self.bins.len())
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn states(&self) -> &[FluxBinState] {
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero_baseline() {
        let mut tracker = FluxTracker::new();
        tracker.record(&[-30.0, 12.5, 0.0, f32::MAX]).unwrap();
        assert_eq!(tracker.frames(), 1);
        for state in tracker.states() {
            assert_eq!(state.deltas(), &[0.0]);
        }
        assert_eq!(tracker.states()[1].previous_magnitude(), Some(12.5));
    }

    #[test]
    fn deltas_are_absolute_differences() {
        let mut tracker = FluxTracker::new();
        tracker.record(&[1.0, -5.0]).unwrap();
        tracker.record(&[0.5, -2.0]).unwrap();
        tracker.record(&[0.5, -6.0]).unwrap();
        assert_eq!(tracker.states()[0].deltas(), &[0.0, 0.5, 0.0]);
        assert_eq!(tracker.states()[1].deltas(), &[0.0, 3.0, 4.0]);
    }

    #[test]
    fn sized_lazily_from_first_frame() {
        let mut tracker = FluxTracker::new();
        assert_eq!(tracker.bin_count(), None);
        tracker.record(&[0.0; 8]).unwrap();
        assert_eq!(tracker.bin_count(), Some(8));
    }

    #[test]
    fn mismatched_frame_leaves_state_untouched() {
        let mut tracker = FluxTracker::new();
        tracker.record(&[1.0; 4]).unwrap();
        let err = tracker.record(&[1.0; 5]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DimensionMismatch {
                frame: 1,
                domain: Domain::Frequency,
                expected: 4,
                actual: 5,
            }
        );
        assert_eq!(tracker.frames(), 1);
        assert!(tracker.states().iter().all(|s| s.deltas().len() == 1));
    }

    #[test]
    fn pre_sized_tracker_rejects_other_lengths() {
        let mut tracker = FluxTracker::with_bin_count(3);
        assert_eq!(tracker.bin_count(), Some(3));
        assert!(tracker.record(&[0.0; 2]).is_err());
        assert!(tracker.record(&[0.0; 3]).is_ok());
    }
}
