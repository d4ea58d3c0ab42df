use anyhow::{Context, Result};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::analyser::{self, Analyser};
use crate::audio::decode::{decode_audio, AudioData};
use crate::audio::source::Source;
use crate::audio::window::SampleWindow;
use crate::engine::{AnalysisResult, AnalysisSession, SessionConfig};
use crate::error::AnalysisError;

/// Everything needed to turn one source into an [`AnalysisResult`].
#[derive(Clone, Debug)]
pub struct DriverSettings {
    pub fft_size: usize,
    pub buffer_size: usize,
    pub smoothing: f32,
    pub window: SampleWindow,
    pub rolloff_threshold: f64,
    pub top_k: usize,
    /// Watchdog fallback if the stream never reports its end
    pub timeout: Duration,
    /// Pace frames at the buffer cadence instead of as fast as possible
    pub realtime: bool,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            fft_size: analyser::DEFAULT_FFT_SIZE,
            buffer_size: analyser::DEFAULT_BUFFER_SIZE,
            smoothing: analyser::DEFAULT_SMOOTHING,
            window: SampleWindow::default(),
            rolloff_threshold: crate::engine::frame::DEFAULT_ROLLOFF_THRESHOLD,
            top_k: crate::engine::frame::DEFAULT_TOP_K,
            timeout: Duration::from_secs(30),
            realtime: false,
        }
    }
}

pub fn analyze_source(source: &Source, settings: &DriverSettings) -> Result<AnalysisResult> {
    let audio = decode_audio(source)?;
    analyze_samples(source.id(), &audio, settings)
}

/// Streams the sampling window of `audio` through a fresh session.
pub fn analyze_samples(
    source_id: String,
    audio: &AudioData,
    settings: &DriverSettings,
) -> Result<AnalysisResult> {
    let config = SessionConfig::new(audio.sample_rate, settings.fft_size)
        .with_bin_count(settings.fft_size / 2)
        .with_rolloff_threshold(settings.rolloff_threshold)
        .with_top_k(settings.top_k);
    let session = Arc::new(AnalysisSession::new(config, source_id)?);

    let (result_tx, result_rx) = mpsc::channel();
    session.on_result(move |result| {
        let _ = result_tx.send(result.clone());
    });

    let (start, end) = settings
        .window
        .sample_range(audio.samples.len(), audio.sample_rate);
    log::info!(
        "{}: analysing {:.2}s - {:.2}s",
        session.source_id(),
        start as f64 / audio.sample_rate as f64,
        end as f64 / audio.sample_rate as f64
    );

    let watchdog = Watchdog::arm(Arc::clone(&session), settings.timeout);
    let cadence = Duration::from_secs_f64(settings.buffer_size as f64 / audio.sample_rate as f64);
    let mut analyser = Analyser::new(settings.fft_size, settings.smoothing);

    for tick in analyser::ticks(start, end, settings.buffer_size) {
        let frame = analyser.analyse(&audio.samples, tick);
        match session.process(frame) {
            Ok(()) => {}
            Err(AnalysisError::SessionClosed) => {
                log::warn!(
                    "{}: stream cut short after {} frames",
                    session.source_id(),
                    session.frame_count()
                );
                break;
            }
            Err(err) => {
                watchdog.disarm();
                return Err(err.into());
            }
        }
        if settings.realtime {
            thread::sleep(cadence);
        }
    }

    let ended = session.signal_end();
    watchdog.disarm();
    ended.with_context(|| {
        format!(
            "{}: no frames in the sampling window (need at least {} samples)",
            session.source_id(),
            settings.buffer_size
        )
    })?;

    result_rx
        .try_recv()
        .with_context(|| format!("{}: session finished without a result", session.source_id()))
}

/// Fires `signal_timeout` on the session unless disarmed first.
struct Watchdog {
    cancel: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Watchdog {
    fn arm(session: Arc<AnalysisSession>, timeout: Duration) -> Self {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(timeout) {
                log::warn!(
                    "{}: no end of stream after {:.1}s, finalizing on timeout",
                    session.source_id(),
                    timeout.as_secs_f64()
                );
                if let Err(err) = session.signal_timeout() {
                    log::error!("{}: {}", session.source_id(), err);
                }
            }
        });
        Self { cancel, handle }
    }

    /// Stops the timer and waits for a finalization already in flight.
    fn disarm(self) {
        drop(self.cancel);
        if self.handle.join().is_err() {
            log::error!("watchdog thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(sample_rate: u32, seconds: f64) -> AudioData {
        let len = (sample_rate as f64 * seconds) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                // 440 Hz with a pulse every quarter second
                let pulse = if (t * 4.0).fract() < 0.05 { 0.4 } else { 0.0 };
                (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.3 + pulse
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn analyses_the_middle_window() {
        let audio = tone(8000, 20.0);
        let settings = DriverSettings {
            fft_size: 256,
            buffer_size: 512,
            ..DriverSettings::default()
        };
        let result = analyze_samples("tone".into(), &audio, &settings).unwrap();
        // 5s at 8 kHz in 512-sample buffers
        assert_eq!(result.frame_count, 78);
        assert_eq!(result.top_bins_by_mean.len(), 10);
        assert_eq!(result.top_bins_by_std.len(), 10);
        assert!(result.average_zcr > 0.0);
        assert!(result.average_centroid.is_some());
    }

    #[test]
    fn window_shorter_than_a_buffer_is_an_error() {
        let audio = tone(8000, 0.1);
        let settings = DriverSettings {
            fft_size: 256,
            buffer_size: 4096,
            ..DriverSettings::default()
        };
        let err = analyze_samples("short".into(), &audio, &settings).unwrap_err();
        assert!(err.to_string().contains("no frames"));
    }

    #[test]
    fn watchdog_finalizes_a_stalled_stream() {
        let audio = tone(8000, 4.0);
        let settings = DriverSettings {
            fft_size: 256,
            buffer_size: 800,
            window: SampleWindow {
                offset: Some(0.0),
                duration: 4.0,
            },
            // 40 frames at 100ms each, timeout after roughly 3 of them
            timeout: Duration::from_millis(250),
            realtime: true,
            ..DriverSettings::default()
        };
        let result = analyze_samples("stalled".into(), &audio, &settings).unwrap();
        assert!(result.frame_count >= 1);
        assert!(result.frame_count < 40);
    }
}
