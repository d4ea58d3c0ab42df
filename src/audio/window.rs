/// Span of a track that gets analysed, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleWindow {
    /// Start of the window. `None` centres the window on the track's middle
    /// point, i.e. starts at `duration / 2`.
    pub offset: Option<f64>,
    pub duration: f64,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            offset: None,
            duration: 5.0,
        }
    }
}

impl SampleWindow {
    /// Sample range `[start, end)` of the window for a track of
    /// `total_samples` samples, clamped to the track.
    pub fn sample_range(&self, total_samples: usize, sample_rate: u32) -> (usize, usize) {
        let rate = sample_rate as f64;
        let track_secs = total_samples as f64 / rate;
        let start_secs = self
            .offset
            .unwrap_or(track_secs / 2.0)
            .clamp(0.0, track_secs);
        let start = ((start_secs * rate) as usize).min(total_samples);
        let len = (self.duration.max(0.0) * rate) as usize;
        let end = start.saturating_add(len).min(total_samples);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_seconds_from_the_middle() {
        let window = SampleWindow::default();
        // 60s track at 1kHz
        assert_eq!(window.sample_range(60_000, 1000), (30_000, 35_000));
    }

    #[test]
    fn clamps_to_track_end() {
        let window = SampleWindow::default();
        // 6s track: starts at 3s, only 3s left
        assert_eq!(window.sample_range(6_000, 1000), (3_000, 6_000));

        let window = SampleWindow {
            offset: Some(100.0),
            duration: 5.0,
        };
        assert_eq!(window.sample_range(6_000, 1000), (6_000, 6_000));
    }

    #[test]
    fn explicit_offset() {
        let window = SampleWindow {
            offset: Some(1.5),
            duration: 2.0,
        };
        assert_eq!(window.sample_range(10_000, 1000), (1_500, 3_500));
    }
}
