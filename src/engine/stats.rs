use serde::Serialize;

use super::flux::FluxBinState;
use super::frame::FrequencyScale;
use crate::error::{AnalysisError, Result};

/// Flux activity of one bin over a whole session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BinSummary {
    pub frequency_hz: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Values that are not finite count as zero.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Arithmetic mean. NaN and infinite entries are treated as `0.0` rather
/// than poisoning the result.
pub fn mean<I>(values: I) -> Result<f64>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + sanitize(v.into()), count + 1));
    if count == 0 {
        return Err(AnalysisError::EmptySeries);
    }
    Ok(sum / count as f64)
}

/// Population standard deviation around an already computed mean.
pub fn population_std_dev<I>(values: I, mean: f64) -> Result<f64>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let variance = self::mean(values.into_iter().map(|v| {
        let d = sanitize(v.into()) - mean;
        d * d
    }))?;
    Ok(variance.sqrt())
}

pub fn summarize_bins(states: &[FluxBinState], scale: FrequencyScale) -> Result<Vec<BinSummary>> {
    states
        .iter()
        .enumerate()
        .map(|(index, state)| {
            let deltas = state.deltas();
            let mean = mean(deltas.iter().copied())?;
            let std_dev = population_std_dev(deltas.iter().copied(), mean)?;
            Ok(BinSummary {
                frequency_hz: scale.hz(index),
                mean,
                std_dev,
            })
        })
        .collect()
}
