use serde::{Deserialize, Serialize};

/// Summary of one analysed source. Produced once per session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source_id: String,
    pub frame_count: usize,
    pub average_zcr: f64,
    /// `None` when no frame carried any spectral magnitude
    pub average_centroid: Option<f64>,
    pub average_rolloff: Option<f64>,
    /// Bin frequencies in Hz, most active first
    pub top_bins_by_mean: Vec<f64>,
    pub top_bins_by_std: Vec<f64>,
}
