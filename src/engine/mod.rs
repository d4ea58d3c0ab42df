//! Streaming spectral feature extraction.
//!
//! Frames flow into an [`AnalysisSession`], which runs the per-frame
//! extractors and the flux tracker, then reduces everything to an
//! [`AnalysisResult`] when the stream ends or the watchdog fires.

pub mod extract;
pub mod flux;
pub mod frame;
pub mod result;
pub mod session;
pub mod stats;
pub mod top_k;

pub use frame::{bin_frequency, Frame, FrequencyScale, SessionConfig};
pub use result::AnalysisResult;
pub use session::{AnalysisSession, CompletionSignal, Phase};
pub use stats::BinSummary;
pub use top_k::Metric;
