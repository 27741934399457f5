//! Rendering of the annotated bearing views.
//!
//! The analysis hands a [`StationStatistics`] to a [`Renderer`]; the
//! default [`PngRenderer`] draws the time series and the bearing
//! distribution with the QC range marked in red.

pub mod histogram;
pub mod png;

pub use self::histogram::Histogram;
pub use self::png::PngRenderer;

use crate::error::Result;
use crate::processor::StationStatistics;
use std::path::Path;

/// Turns a station's annotated statistics into an artifact at `path`
pub trait Renderer: Send + Sync {
    fn render(&self, statistics: &StationStatistics, path: &Path) -> Result<()>;
}
