//! Integration tests for the processor module
//!
//! Runs the station pipeline against temporary radial directories and
//! in-memory gridded datasets, with a renderer that records instead of
//! drawing.

pub mod error_handling;

use crate::config::Config;
use crate::error::{AvrbError, Result};
use crate::extract::{DatasetOpener, GridDimension, GridVariable, GriddedDataset, MemoryDataset};
use crate::models::StationRecord;
use crate::processor::{StationAnalyzer, StationStatistics};
use crate::render::Renderer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const NETWORK: &str = "HFR-TEST";
pub const ADDRESS: &str = "https://thredds.example.org/dodsC/radial/AAAA_aggregated";

/// Renderer that keeps what it was asked to draw
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: Mutex<Vec<(PathBuf, StationStatistics)>>,
}

impl RecordingRenderer {
    pub fn count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.rendered
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, statistics: &StationStatistics, path: &Path) -> Result<()> {
        self.rendered
            .lock()
            .unwrap()
            .push((path.to_path_buf(), statistics.clone()));
        Ok(())
    }
}

/// Renderer that always fails
pub struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&self, _statistics: &StationStatistics, path: &Path) -> Result<()> {
        Err(AvrbError::RenderFailed {
            path: path.to_path_buf(),
            reason: "disk full".to_string(),
        })
    }
}

/// LLUV-like radial file with the bearing in column 14
pub fn ruv_content(timestamp: &str, bearings: &[f64]) -> String {
    let mut content = String::from("%CTF: 1.00\n%FileType: LLUV rdls \"RadialMap\"\n");
    content.push_str(&format!("%TimeStamp: {timestamp}\n"));
    content.push_str("%TableStart:\n");
    for bearing in bearings {
        content.push_str(&format!(
            "  9.8 44.0 -1.2 3.4 0 999 999 10 -10 1 1 2.0 3.0 1.5 {bearing:.1} 4.2 12.0 1\n"
        ));
    }
    content.push_str("%TableEnd:\n%End:\n");
    content
}

pub fn write_ruv(dir: &Path, name: &str, timestamp: &str, bearings: &[f64]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), ruv_content(timestamp, bearings)).unwrap();
}

pub fn tabular_record(station_id: &str, folder: &Path) -> StationRecord {
    StationRecord {
        network_id: NETWORK.to_string(),
        station_id: station_id.to_string(),
        qc_min: Some(20.0),
        qc_max: Some(250.0),
        radial_input_folder_path: Some(folder.to_path_buf()),
        opendap_data_url: None,
    }
}

pub fn gridded_record(station_id: &str) -> StationRecord {
    StationRecord {
        network_id: NETWORK.to_string(),
        station_id: station_id.to_string(),
        qc_min: Some(20.0),
        qc_max: Some(250.0),
        radial_input_folder_path: None,
        opendap_data_url: Some(ADDRESS.to_string()),
    }
}

pub fn test_config(temp_dir: &TempDir) -> Config {
    Config::default()
        .with_output_root(temp_dir.path().join("output"))
        .without_progress()
}

/// Two time steps (2020-01-02 then 2020-01-01) of a 1x2x2 DRVA grid
pub fn memory_dataset() -> MemoryDataset {
    MemoryDataset::new(ADDRESS)
        .with_variable(
            "TIME",
            GridVariable {
                dimensions: vec![GridDimension::new("TIME", 2)],
                values: vec![25568.0, 25567.0],
                units: Some("days since 1950-01-01T00:00:00Z".to_string()),
            },
        )
        .with_variable(
            "DRVA",
            GridVariable {
                dimensions: vec![
                    GridDimension::new("TIME", 2),
                    GridDimension::new("DEPTH", 1),
                    GridDimension::new("BEAR", 2),
                    GridDimension::new("RNGE", 2),
                ],
                values: vec![10.0, 12.0, f64::NAN, 8.0, 190.0, 170.0, 180.0, f64::NAN],
                units: Some("degrees_true".to_string()),
            },
        )
}

pub fn memory_opener() -> Arc<dyn DatasetOpener> {
    Arc::new(|_: &str| -> Result<Box<dyn GriddedDataset>> { Ok(Box::new(memory_dataset())) })
}

pub fn analyzer(temp_dir: &TempDir, renderer: Arc<dyn Renderer>) -> StationAnalyzer {
    StationAnalyzer::with_components(test_config(temp_dir), renderer, memory_opener()).unwrap()
}
