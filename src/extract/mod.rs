//! Bearing extraction from the two radial source formats.
//!
//! Both extractors turn their source into the same canonical output: one
//! [`ObservationBatch`] per time unit plus the warnings raised by units that
//! had to be skipped. Everything downstream is format-agnostic.

pub mod gridded;
pub mod tabular;

pub use self::gridded::{
    DatasetOpener, GridDimension, GridVariable, GriddedDataset, GriddedExtractor, MemoryDataset,
    default_opener,
};
pub use self::tabular::TabularExtractor;

use crate::error::Result;
use crate::models::{ObservationBatch, SourceWarning, StationContext};

/// Observations gathered from one station source
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub batches: Vec<ObservationBatch>,
    pub warnings: Vec<SourceWarning>,
    /// Number of source units discovered, including skipped ones
    pub units_found: usize,
}

/// A radial source format able to produce bearing observations for a station
pub trait BearingExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Extract every usable observation batch for the station.
    ///
    /// Unit-level problems are returned as warnings; only failures that leave
    /// the station without any source are errors.
    fn extract(&self, context: &StationContext) -> Result<Extraction>;
}
