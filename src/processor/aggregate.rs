//! Reduction of observation batches to the two derived views.
//!
//! Each batch becomes one circular-mean average in the time series, and
//! every finite observation joins the distribution pool.

use crate::circular::summarize;
use crate::models::{
    BearingDistribution, BearingTimeSeries, ObservationBatch, SourceWarning, TimestampedAverage,
    WarningReason,
};
use tracing::debug;

/// Time series and distribution built from one station's batches
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub time_series: BearingTimeSeries,
    pub distribution: BearingDistribution,
    /// Batches that produced no average
    pub warnings: Vec<SourceWarning>,
}

/// Aggregate batches in any order into a sorted time series and a pool
pub fn aggregate(batches: &[ObservationBatch]) -> Aggregation {
    let mut averages = Vec::with_capacity(batches.len());
    let mut distribution = BearingDistribution::new();
    let mut warnings = Vec::new();

    for batch in batches {
        distribution.extend(batch.bearings().filter(|b| b.is_finite()));

        match summarize(batch.bearings()) {
            Some(summary) => averages.push(TimestampedAverage {
                timestamp: batch.timestamp,
                value: summary.mean,
                count: summary.count,
            }),
            None => {
                debug!(
                    "No defined mean bearing at {} ({} observations)",
                    batch.timestamp,
                    batch.observations.len()
                );
                warnings.push(SourceWarning {
                    source: batch.timestamp.to_rfc3339(),
                    reason: WarningReason::NoDefinedMean,
                });
            }
        }
    }

    Aggregation {
        time_series: BearingTimeSeries::from_averages(averages),
        distribution,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circular::angular_difference;
    use crate::models::BearingObservation;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 4, 14, hour, 0, 0).unwrap()
    }

    fn batch(hour: u32, bearings: &[f64]) -> ObservationBatch {
        ObservationBatch {
            timestamp: at(hour),
            observations: bearings.iter().map(|&b| BearingObservation::new(b)).collect(),
        }
    }

    #[test]
    fn test_unsorted_batches_give_sorted_series() {
        let batches = vec![
            batch(13, &[30.0]),
            batch(11, &[10.0]),
            batch(12, &[20.0]),
        ];
        let aggregation = aggregate(&batches);

        let times: Vec<_> = aggregation
            .time_series
            .entries()
            .iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(times, vec![at(11), at(12), at(13)]);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_average_is_circular() {
        let aggregation = aggregate(&[batch(0, &[350.0, 10.0])]);
        let entry = aggregation.time_series.entries()[0];
        assert!(angular_difference(entry.value, 0.0) < 1e-9);
        assert_eq!(entry.count, 2);
    }

    #[test]
    fn test_distribution_pools_every_observation() {
        let aggregation = aggregate(&[
            batch(1, &[10.0, 10.0, f64::NAN]),
            batch(2, &[20.0]),
        ]);
        let mut pool = aggregation.distribution.values().to_vec();
        pool.sort_by(f64::total_cmp);
        assert_eq!(pool, vec![10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_batch_without_mean_is_omitted_with_warning() {
        let aggregation = aggregate(&[batch(1, &[]), batch(2, &[0.0, 180.0]), batch(3, &[5.0])]);

        assert_eq!(aggregation.time_series.len(), 1);
        assert_eq!(aggregation.warnings.len(), 2);
        assert!(
            aggregation
                .warnings
                .iter()
                .all(|w| w.reason == WarningReason::NoDefinedMean)
        );
        // Opposite bearings still count towards the distribution
        assert_eq!(aggregation.distribution.len(), 3);
    }

    #[test]
    fn test_duplicate_timestamps_are_kept() {
        let aggregation = aggregate(&[batch(5, &[10.0]), batch(5, &[20.0])]);
        assert_eq!(aggregation.time_series.len(), 2);
    }
}
