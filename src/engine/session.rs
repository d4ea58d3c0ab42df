use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use super::extract::{self, FrameFeatures};
use super::flux::FluxTracker;
use super::frame::{Frame, FrequencyScale, SessionConfig};
use super::result::AnalysisResult;
use super::stats;
use super::top_k::{select_top, Metric};
use crate::error::{AnalysisError, Domain, Result};

const CONFIGURED: u8 = 0;
const COLLECTING: u8 = 1;
const FINALIZING: u8 = 2;
const COMPLETED: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Configured,
    Collecting,
    Finalizing,
    Completed,
}

impl Phase {
    fn from_raw(raw: u8) -> Self {
        match raw {
            CONFIGURED => Phase::Configured,
            COLLECTING => Phase::Collecting,
            FINALIZING => Phase::Finalizing,
            _ => Phase::Completed,
        }
    }
}

/// What closed the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionSignal {
    EndOfStream,
    Timeout,
}

type ResultCallback = Box<dyn FnOnce(&AnalysisResult) + Send>;

#[derive(Default)]
struct FeatureSeries {
    zcr: Vec<u32>,
    centroid: Vec<Option<f64>>,
    rolloff: Vec<Option<f64>>,
}

impl FeatureSeries {
    fn push(&mut self, features: FrameFeatures) {
        self.zcr.push(features.zcr);
        self.centroid.push(features.centroid);
        self.rolloff.push(features.rolloff);
    }
}

struct Collector {
    series: FeatureSeries,
    flux: FluxTracker,
    time_domain_len: Option<usize>,
}

/// Feeds frames through feature extraction and flux tracking for one source
/// and reduces them to an [`AnalysisResult`] exactly once.
///
/// Either completion signal may arrive first, from any thread; the other one
/// becomes a no-op. Frames are expected from a single producer in temporal
/// order.
pub struct AnalysisSession {
    config: SessionConfig,
    scale: FrequencyScale,
    source_id: String,
    phase: AtomicU8,
    collector: Mutex<Collector>,
    callback: Mutex<Option<ResultCallback>>,
    result: OnceLock<AnalysisResult>,
    completed_by: OnceLock<CompletionSignal>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AnalysisSession {
    /// Session with default rolloff threshold and top-K size.
    pub fn configure(sample_rate: u32, fft_size: usize, source_id: impl Into<String>) -> Result<Self> {
        Self::new(SessionConfig::new(sample_rate, fft_size), source_id)
    }

    pub fn new(config: SessionConfig, source_id: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let flux = match config.bin_count {
            Some(bins) => FluxTracker::with_bin_count(bins),
            None => FluxTracker::new(),
        };
        Ok(Self {
            scale: config.scale(),
            config,
            source_id: source_id.into(),
            phase: AtomicU8::new(CONFIGURED),
            collector: Mutex::new(Collector {
                series: FeatureSeries::default(),
                flux,
                time_domain_len: None,
            }),
            callback: Mutex::new(None),
            result: OnceLock::new(),
            completed_by: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scale(&self) -> FrequencyScale {
        self.scale
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn phase(&self) -> Phase {
        Phase::from_raw(self.phase.load(Ordering::Acquire))
    }

    pub fn frame_count(&self) -> usize {
        lock(&self.collector).flux.frames()
    }

    pub fn completed_by(&self) -> Option<CompletionSignal> {
        self.completed_by.get().copied()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.get()
    }

    pub fn process(&self, frame: Frame<'_>) -> Result<()> {
        self.process_frame(frame.time_domain, frame.freq_domain)
    }

    /// Extracts features from one frame and records its flux.
    ///
    /// A frame whose lengths differ from the session's is rejected without
    /// touching any state.
    pub fn process_frame(&self, time_domain: &[u8], freq_domain: &[f32]) -> Result<()> {
        let mut collector = lock(&self.collector);

        // Checked under the collector lock so no frame lands after
        // finalization has taken its snapshot.
        if self.phase.load(Ordering::Acquire) >= FINALIZING {
            log::warn!("{}: frame rejected, session already closed", self.source_id);
            return Err(AnalysisError::SessionClosed);
        }

        let frame = collector.flux.frames();
        if let Some(expected) = collector.time_domain_len {
            if time_domain.len() != expected {
                return Err(AnalysisError::DimensionMismatch {
                    frame,
                    domain: Domain::Time,
                    expected,
                    actual: time_domain.len(),
                });
            }
        }
        if let Some(expected) = collector.flux.bin_count() {
            if freq_domain.len() != expected {
                return Err(AnalysisError::DimensionMismatch {
                    frame,
                    domain: Domain::Frequency,
                    expected,
                    actual: freq_domain.len(),
                });
            }
        }

        let features = extract::extract(
            time_domain,
            freq_domain,
            self.config.rolloff_threshold,
            self.scale,
        );
        collector.flux.record(freq_domain)?;
        collector.series.push(features);
        collector.time_domain_len.get_or_insert(time_domain.len());

        if self
            .phase
            .compare_exchange(CONFIGURED, COLLECTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            log::debug!(
                "{}: collecting ({} bins, {} samples per frame)",
                self.source_id,
                freq_domain.len(),
                time_domain.len()
            );
        }
        Ok(())
    }

    /// The stream reported its natural end.
    ///
    /// Returns `Ok(true)` if this call finalized the session and `Ok(false)`
    /// if an earlier signal already had.
    pub fn signal_end(&self) -> Result<bool> {
        self.complete(CompletionSignal::EndOfStream)
    }

    /// Watchdog fallback for streams that never report their end.
    pub fn signal_timeout(&self) -> Result<bool> {
        self.complete(CompletionSignal::Timeout)
    }

    /// Registers the receiver of the result. Invoked exactly once; if the
    /// session has already completed, it runs immediately. A later
    /// registration replaces a pending one.
    pub fn on_result<F>(&self, callback: F)
    where
        F: FnOnce(&AnalysisResult) + Send + 'static,
    {
        let mut slot = lock(&self.callback);
        match self.result.get() {
            Some(result) => {
                drop(slot);
                callback(result);
            }
            None => *slot = Some(Box::new(callback)),
        }
    }

    fn complete(&self, signal: CompletionSignal) -> Result<bool> {
        let mut current = self.phase.load(Ordering::Acquire);
        loop {
            if current >= FINALIZING {
                log::debug!("{}: ignoring {:?}, already finalized", self.source_id, signal);
                return Ok(false);
            }
            match self
                .phase
                .compare_exchange(current, FINALIZING, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        let _ = self.completed_by.set(signal);
        log::debug!("{}: finalizing on {:?}", self.source_id, signal);

        let outcome = self.finalize();
        if let Ok(result) = &outcome {
            self.deliver(result.clone());
        }
        self.phase.store(COMPLETED, Ordering::Release);
        outcome.map(|_| true)
    }

    fn finalize(&self) -> Result<AnalysisResult> {
        let collector = lock(&self.collector);
        let frame_count = collector.flux.frames();
        if frame_count == 0 {
            return Err(AnalysisError::EmptySeries);
        }

        let series = &collector.series;
        let average_zcr = stats::mean(series.zcr.iter().copied())?;
        let average_centroid = mean_of_present(&series.centroid)?;
        let average_rolloff = mean_of_present(&series.rolloff)?;

        let summaries = stats::summarize_bins(collector.flux.states(), self.scale)?;
        let top_bins_by_mean = select_top(&summaries, Metric::Mean, self.config.top_k);
        let top_bins_by_std = select_top(&summaries, Metric::StdDev, self.config.top_k);

        Ok(AnalysisResult {
            source_id: self.source_id.clone(),
            frame_count,
            average_zcr,
            average_centroid,
            average_rolloff,
            top_bins_by_mean,
            top_bins_by_std,
        })
    }

    fn deliver(&self, result: AnalysisResult) {
        let result = self.result.get_or_init(|| result);
        let callback = lock(&self.callback).take();
        if let Some(callback) = callback {
            callback(result);
        }
    }
}

/// Mean over frames that produced a value; `None` if none did.
fn mean_of_present(values: &[Option<f64>]) -> Result<Option<f64>> {
    match stats::mean(values.iter().flatten().copied()) {
        Ok(mean) => Ok(Some(mean)),
        Err(AnalysisError::EmptySeries) => Ok(None),
        Err(err) => Err(err),
    }
}
