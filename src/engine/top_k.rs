use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::stats::BinSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mean,
    StdDev,
}

impl Metric {
    fn of(self, summary: &BinSummary) -> f64 {
        match self {
            Metric::Mean => summary.mean,
            Metric::StdDev => summary.std_dev,
        }
    }
}

/// Frequencies of the `k` most active bins, highest metric first.
///
/// Equal metric values are ordered by ascending frequency, so a session with
/// no flux at all yields the lowest `k` bins. Asking for more bins than exist
/// returns all of them.
pub fn select_top(summaries: &[BinSummary], metric: Metric, k: usize) -> Vec<f64> {
    let mut ranked: Vec<&BinSummary> = summaries.iter().collect();
    let by_rank = |a: &&BinSummary, b: &&BinSummary| -> Ordering {
        metric
            .of(b)
            .total_cmp(&metric.of(a))
            .then_with(|| a.frequency_hz.total_cmp(&b.frequency_hz))
    };

    if k < ranked.len() {
        ranked.select_nth_unstable_by(k, by_rank);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(by_rank);
    ranked.into_iter().map(|s| s.frequency_hz).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(frequency_hz: f64, mean: f64, std_dev: f64) -> BinSummary {
        BinSummary {
            frequency_hz,
            mean,
            std_dev,
        }
    }

    #[test]
    fn orders_descending_by_metric() {
        let summaries = vec![
            summary(10.0, 0.1, 3.0),
            summary(20.0, 0.9, 1.0),
            summary(30.0, 0.5, 2.0),
        ];
        assert_eq!(select_top(&summaries, Metric::Mean, 10), vec![20.0, 30.0, 10.0]);
        assert_eq!(select_top(&summaries, Metric::StdDev, 10), vec![10.0, 30.0, 20.0]);
        assert_eq!(select_top(&summaries, Metric::Mean, 2), vec![20.0, 30.0]);
    }

    #[test]
    fn stable_under_input_reordering() {
        let summaries: Vec<BinSummary> = (0..40)
            .map(|i| summary(i as f64 * 21.5, ((i * 7) % 40) as f64, 0.0))
            .collect();
        let expected = select_top(&summaries, Metric::Mean, 10);

        let mut reversed = summaries.clone();
        reversed.reverse();
        assert_eq!(select_top(&reversed, Metric::Mean, 10), expected);

        let mut rotated = summaries.clone();
        rotated.rotate_left(13);
        assert_eq!(select_top(&rotated, Metric::Mean, 10), expected);
    }

    #[test]
    fn ties_break_by_ascending_frequency() {
        let summaries = vec![
            summary(300.0, 1.0, 0.0),
            summary(100.0, 1.0, 0.0),
            summary(200.0, 2.0, 0.0),
            summary(50.0, 1.0, 0.0),
        ];
        assert_eq!(
            select_top(&summaries, Metric::Mean, 3),
            vec![200.0, 50.0, 100.0]
        );
    }

    #[test]
    fn silent_session_returns_lowest_bins() {
        let summaries: Vec<BinSummary> =
            (0..32).rev().map(|i| summary(i as f64, 0.0, 0.0)).collect();
        assert_eq!(
            select_top(&summaries, Metric::StdDev, 4),
            vec![0.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn k_larger_than_input_returns_everything() {
        let summaries = vec![summary(1.0, 0.0, 0.0), summary(2.0, 0.3, 0.0)];
        assert_eq!(select_top(&summaries, Metric::Mean, 10), vec![2.0, 1.0]);
        assert!(select_top(&[], Metric::Mean, 10).is_empty());
    }
}
