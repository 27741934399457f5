//! QC range annotation of the derived views.
//!
//! The configured acceptance range travels with each view for display.
//! It is attached as read from the station record: no ordering or bounds
//! check is applied.

use crate::models::{
    BearingDistribution, BearingTimeSeries, ProcessingStats, QcRange, SourceWarning,
    StationContext,
};

/// A derived view paired with the station's QC range
#[derive(Debug, Clone, PartialEq)]
pub struct QcAnnotated<T> {
    pub data: T,
    pub qc_range: QcRange,
}

impl<T> QcAnnotated<T> {
    pub fn new(data: T, qc_range: QcRange) -> Self {
        Self { data, qc_range }
    }
}

/// Everything handed to rendering for one station
#[derive(Debug, Clone)]
pub struct StationStatistics {
    pub network_id: String,
    pub station_id: String,
    pub time_series: QcAnnotated<BearingTimeSeries>,
    pub distribution: QcAnnotated<BearingDistribution>,
    pub warnings: Vec<SourceWarning>,
    pub stats: ProcessingStats,
}

/// Attach the station's QC range to both views
pub fn annotate(
    context: &StationContext,
    time_series: BearingTimeSeries,
    distribution: BearingDistribution,
    warnings: Vec<SourceWarning>,
    stats: ProcessingStats,
) -> StationStatistics {
    StationStatistics {
        network_id: context.network_id.clone(),
        station_id: context.station_id.clone(),
        time_series: QcAnnotated::new(time_series, context.qc_range),
        distribution: QcAnnotated::new(distribution, context.qc_range),
        warnings,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceLocator;
    use std::path::PathBuf;

    fn context(qc_range: QcRange) -> StationContext {
        StationContext {
            network_id: "HFR-TEST".to_string(),
            station_id: "AAAA".to_string(),
            qc_range,
            locator: SourceLocator::Directory(PathBuf::from("/data")),
        }
    }

    #[test]
    fn test_range_is_passed_through_unchanged() {
        let ranges = [
            QcRange {
                min: 10.0,
                max: 200.0,
            },
            QcRange {
                min: 300.0,
                max: 40.0,
            },
            QcRange {
                min: -15.5,
                max: 725.25,
            },
            QcRange {
                min: 90.0,
                max: 90.0,
            },
        ];

        for range in ranges {
            let stats = annotate(
                &context(range),
                BearingTimeSeries::default(),
                BearingDistribution::default(),
                Vec::new(),
                ProcessingStats::default(),
            );
            assert_eq!(stats.time_series.qc_range, range);
            assert_eq!(stats.distribution.qc_range, range);
        }
    }

    #[test]
    fn test_identity_is_copied_from_context() {
        let stats = annotate(
            &context(QcRange { min: 0.0, max: 1.0 }),
            BearingTimeSeries::default(),
            BearingDistribution::default(),
            Vec::new(),
            ProcessingStats::default(),
        );
        assert_eq!(stats.network_id, "HFR-TEST");
        assert_eq!(stats.station_id, "AAAA");
    }
}
