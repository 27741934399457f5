//! Gridded radial dataset extraction.
//!
//! Aggregated radial datasets expose the radial direction as a
//! time/depth/bearing/range indexed variable (`DRVA`) in the "coming from"
//! convention, plus a CF-encoded time coordinate. Access goes through the
//! [`DatasetOpener`] and [`GriddedDataset`] traits so the netCDF backend can
//! be swapped for an in-memory grid.

use super::{BearingExtractor, Extraction};
use crate::cf_time::CfTimeUnits;
use crate::circular::{normalize_degrees, reverse_direction};
use crate::config::GriddedConfig;
use crate::error::{AvrbError, Result, SkipReason};
use crate::models::{
    BearingObservation, GridCell, ObservationBatch, SourceLocator, SourceWarning, StationContext,
    WarningReason,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Named dimension of a gridded variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDimension {
    pub name: String,
    pub len: usize,
}

impl GridDimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

/// A variable read in full from a gridded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct GridVariable {
    pub dimensions: Vec<GridDimension>,
    /// Row-major values with packing applied; missing cells are NaN
    pub values: Vec<f64>,
    /// CF `units` attribute, if any
    pub units: Option<String>,
}

impl GridVariable {
    fn expected_len(&self) -> usize {
        self.dimensions.iter().map(|d| d.len).product()
    }

    fn axis(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    /// Row-major stride of every dimension
    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.dimensions.len()];
        for i in (0..self.dimensions.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dimensions[i + 1].len;
        }
        strides
    }
}

/// An opened multi-dimensional dataset
pub trait GriddedDataset {
    /// Read a whole variable, applying scale/offset and masking fill values
    fn read_variable(&self, name: &str) -> Result<GridVariable>;
}

/// Opens gridded datasets by address
pub trait DatasetOpener: Send + Sync {
    fn open(&self, address: &str) -> Result<Box<dyn GriddedDataset>>;
}

impl<F> DatasetOpener for F
where
    F: Fn(&str) -> Result<Box<dyn GriddedDataset>> + Send + Sync,
{
    fn open(&self, address: &str) -> Result<Box<dyn GriddedDataset>> {
        self(address)
    }
}

/// Gridded dataset held in memory, e.g. a pre-fetched grid or a test fixture
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    address: String,
    variables: HashMap<String, GridVariable>,
}

impl MemoryDataset {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            variables: HashMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable: GridVariable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }
}

impl GriddedDataset for MemoryDataset {
    fn read_variable(&self, name: &str) -> Result<GridVariable> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| AvrbError::invalid_dataset(&self.address, format!("missing variable {name}")))
    }
}

/// Opener used when the crate is built without a gridded backend
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedOpener;

impl DatasetOpener for UnsupportedOpener {
    fn open(&self, address: &str) -> Result<Box<dyn GriddedDataset>> {
        Err(AvrbError::remote_unavailable(
            address,
            "built without netCDF support (enable the `netcdf` feature)",
        ))
    }
}

/// The netCDF/OPeNDAP opener when available, otherwise [`UnsupportedOpener`]
pub fn default_opener() -> Arc<dyn DatasetOpener> {
    #[cfg(feature = "netcdf")]
    {
        Arc::new(native::NetCdfOpener)
    }
    #[cfg(not(feature = "netcdf"))]
    {
        Arc::new(UnsupportedOpener)
    }
}

/// Extractor for aggregated gridded radial datasets
#[derive(Clone)]
pub struct GriddedExtractor {
    config: GriddedConfig,
    opener: Arc<dyn DatasetOpener>,
}

impl std::fmt::Debug for GriddedExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GriddedExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GriddedExtractor {
    pub fn new(config: GriddedConfig, opener: Arc<dyn DatasetOpener>) -> Self {
        Self { config, opener }
    }

    /// Convert a raw direction value into a bearing in [0, 360)
    pub fn to_bearing(&self, direction: f64) -> f64 {
        if self.config.reverse_direction {
            reverse_direction(direction)
        } else {
            normalize_degrees(direction)
        }
    }

    /// Split an opened dataset into one observation batch per time step
    pub fn extract_dataset(
        &self,
        address: &str,
        dataset: &dyn GriddedDataset,
    ) -> Result<Extraction> {
        let direction = dataset.read_variable(&self.config.direction_variable)?;
        let time = dataset.read_variable(&self.config.time_variable)?;

        if direction.values.len() != direction.expected_len() {
            return Err(AvrbError::invalid_dataset(
                address,
                format!(
                    "{} holds {} values but its dimensions imply {}",
                    self.config.direction_variable,
                    direction.values.len(),
                    direction.expected_len()
                ),
            ));
        }

        let time_axis = direction.axis(&self.config.time_variable).ok_or_else(|| {
            AvrbError::invalid_dataset(
                address,
                format!(
                    "{} has no {} dimension",
                    self.config.direction_variable, self.config.time_variable
                ),
            )
        })?;
        let steps = direction.dimensions[time_axis].len;
        if time.values.len() != steps {
            return Err(AvrbError::invalid_dataset(
                address,
                format!(
                    "{} has {} values for {} time steps",
                    self.config.time_variable,
                    time.values.len(),
                    steps
                ),
            ));
        }

        let units_attr = time.units.as_deref().ok_or_else(|| {
            AvrbError::invalid_dataset(
                address,
                format!("{} has no units attribute", self.config.time_variable),
            )
        })?;
        let units = CfTimeUnits::parse(units_attr)
            .map_err(|reason| AvrbError::invalid_dataset(address, reason))?;

        let strides = direction.strides();
        let range_axis = direction.axis(&self.config.range_dimension);
        let bearing_axis = direction.axis(&self.config.bearing_dimension);
        let depth_axis = direction.axis(&self.config.depth_dimension);
        let index_on = |axis: Option<usize>, flat: usize| {
            axis.map(|a| (flat / strides[a]) % direction.dimensions[a].len)
        };

        let mut per_step: Vec<Vec<BearingObservation>> = vec![Vec::new(); steps];
        for (flat, &value) in direction.values.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let step = (flat / strides[time_axis]) % steps;
            let cell = GridCell {
                range: index_on(range_axis, flat),
                bearing: index_on(bearing_axis, flat),
                depth: index_on(depth_axis, flat),
            };
            per_step[step].push(BearingObservation::in_cell(self.to_bearing(value), cell));
        }

        let mut extraction = Extraction {
            units_found: steps,
            ..Extraction::default()
        };
        for (step, observations) in per_step.into_iter().enumerate() {
            let raw_time = time.values[step];
            match units.decode(raw_time) {
                Some(timestamp) => extraction.batches.push(ObservationBatch {
                    timestamp,
                    observations,
                }),
                None => {
                    warn!("Skipping time step {} with undecodable time {}", step, raw_time);
                    extraction.warnings.push(SourceWarning {
                        source: format!("{address}[{}={step}]", self.config.time_variable),
                        reason: WarningReason::Skipped(SkipReason::InvalidTimestamp {
                            text: raw_time.to_string(),
                        }),
                    });
                }
            }
        }

        debug!(
            "Extracted {} time steps with {} cells each from {}",
            steps,
            direction.expected_len() / steps.max(1),
            address
        );
        Ok(extraction)
    }
}

impl BearingExtractor for GriddedExtractor {
    fn name(&self) -> &'static str {
        "gridded"
    }

    fn extract(&self, context: &StationContext) -> Result<Extraction> {
        let address = match &context.locator {
            SourceLocator::Remote(address) => address,
            SourceLocator::Directory(path) => {
                return Err(AvrbError::configuration(format!(
                    "gridded extraction needs a dataset address, got directory {}",
                    path.display()
                )));
            }
        };

        info!("Opening gridded dataset {}", address);
        let dataset = self.opener.open(address)?;
        self.extract_dataset(address, dataset.as_ref())
    }
}

#[cfg(feature = "netcdf")]
mod native {
    //! netCDF backend; OPeNDAP URLs work when libnetcdf is built with DAP.

    use super::{DatasetOpener, GridDimension, GridVariable, GriddedDataset};
    use crate::error::{AvrbError, Result};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct NetCdfOpener;

    impl DatasetOpener for NetCdfOpener {
        fn open(&self, address: &str) -> Result<Box<dyn GriddedDataset>> {
            let file =
                netcdf::open(address).map_err(|e| AvrbError::remote_unavailable(address, e))?;
            Ok(Box::new(NetCdfDataset {
                address: address.to_string(),
                file,
            }))
        }
    }

    struct NetCdfDataset {
        address: String,
        file: netcdf::File,
    }

    impl GriddedDataset for NetCdfDataset {
        fn read_variable(&self, name: &str) -> Result<GridVariable> {
            let var = self.file.variable(name).ok_or_else(|| {
                AvrbError::invalid_dataset(&self.address, format!("missing variable {name}"))
            })?;

            let dimensions = var
                .dimensions()
                .iter()
                .map(|d| GridDimension::new(d.name(), d.len()))
                .collect();

            let raw = read_as_f64(&var).map_err(|e| {
                AvrbError::remote_unavailable(&self.address, format!("failed to read {name}: {e}"))
            })?;

            let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
            let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
            let fill_value = get_f64_attr(&var, "_FillValue");

            let values = raw
                .into_iter()
                .map(|val| {
                    if !val.is_finite() || fill_value.is_some_and(|fill| val == fill) {
                        f64::NAN
                    } else {
                        val * scale_factor + add_offset
                    }
                })
                .collect();

            Ok(GridVariable {
                dimensions,
                values,
                units: get_str_attr(&var, "units"),
            })
        }
    }

    /// Read a numeric variable whatever its storage type
    fn read_as_f64(var: &netcdf::Variable) -> std::result::Result<Vec<f64>, netcdf::Error> {
        let doubles: std::result::Result<Vec<f64>, _> = var.get_values(..);
        if let Ok(values) = doubles {
            return Ok(values);
        }
        let floats: std::result::Result<Vec<f32>, _> = var.get_values(..);
        if let Ok(values) = floats {
            return Ok(values.into_iter().map(f64::from).collect());
        }
        let ints: std::result::Result<Vec<i32>, _> = var.get_values(..);
        if let Ok(values) = ints {
            return Ok(values.into_iter().map(f64::from).collect());
        }
        let shorts: Vec<i16> = var.get_values(..)?;
        Ok(shorts.into_iter().map(f64::from).collect())
    }

    /// Check for an attribute first to avoid HDF5 error spam on optional ones
    fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
        var.attributes().any(|attr| attr.name() == name)
    }

    fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
        if !has_attr(var, name) {
            return None;
        }
        let attr_value = var.attribute_value(name)?.ok()?;
        f64::try_from(attr_value).ok()
    }

    fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
        if !has_attr(var, name) {
            return None;
        }
        match var.attribute_value(name)?.ok()? {
            netcdf::AttributeValue::Str(value) => Some(value),
            _ => None,
        }
    }
}
