//! Station registry for network and station metadata lookups
//!
//! The registry is a read-only TOML file listing HF radar networks and the
//! stations that belong to them:
//!
//! ```toml
//! [[network]]
//! network_id = "HFR-TirLig"
//! name = "Tirreno-Ligure"
//!
//! [[station]]
//! network_id = "HFR-TirLig"
//! station_id = "TINO"
//! radial_qc_average_radial_bearing_min = 125.0
//! radial_qc_average_radial_bearing_max = 305.0
//! radial_input_folder_path = "/data/radials/TINO"
//! opendap_data_url = "https://thredds.example.org/dodsC/TINO_aggregated"
//! ```
//!
//! Stations keep their file order. Missing per-station fields are not an
//! error here; they fail only the affected station when it is analysed.

use crate::error::{AvrbError, Result};
use crate::models::StationRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An HF radar network entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub network_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "network")]
    networks: Vec<NetworkRecord>,
    #[serde(default, rename = "station")]
    stations: Vec<StationRecord>,
}

/// Station registry loaded from TOML
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    networks: Vec<NetworkRecord>,
    stations: Vec<StationRecord>,
    source: Option<PathBuf>,
}

impl StationRegistry {
    /// Load the registry from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AvrbError::Registry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut registry = Self::parse(&text, path)?;
        registry.source = Some(path.to_path_buf());
        debug!(
            "Loaded {} networks and {} stations from {}",
            registry.networks.len(),
            registry.stations.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parse registry TOML held in memory
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        let file: RegistryFile = toml::from_str(text).map_err(|e| AvrbError::Registry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        // Unnamed stations are left for the analyzer to reject
        for station in file.stations.iter().filter(|s| !s.station_id.trim().is_empty()) {
            if !seen.insert((station.network_id.as_str(), station.station_id.as_str())) {
                return Err(AvrbError::Registry {
                    path: path.to_path_buf(),
                    reason: format!(
                        "station {} listed twice in network {}",
                        station.station_id, station.network_id
                    ),
                });
            }
        }

        Ok(Self {
            networks: file.networks,
            stations: file.stations,
            source: None,
        })
    }

    pub fn networks(&self) -> &[NetworkRecord] {
        &self.networks
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// File the registry was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Look up a declared network
    pub fn network(&self, network_id: &str) -> Option<&NetworkRecord> {
        self.networks.iter().find(|n| n.network_id == network_id)
    }

    /// Stations of a network in registry order.
    ///
    /// A network is known when it is declared or has at least one station;
    /// a declared network without stations yields an empty list.
    pub fn stations_for_network(&self, network_id: &str) -> Result<Vec<StationRecord>> {
        let stations: Vec<StationRecord> = self
            .stations
            .iter()
            .filter(|s| s.network_id == network_id)
            .cloned()
            .collect();

        if stations.is_empty() && self.network(network_id).is_none() {
            return Err(AvrbError::NetworkNotFound {
                network_id: network_id.to_string(),
            });
        }
        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"
[[network]]
network_id = "HFR-TirLig"
name = "Tirreno-Ligure"

[[network]]
network_id = "HFR-Empty"

[[station]]
network_id = "HFR-TirLig"
station_id = "TINO"
radial_qc_average_radial_bearing_min = 125.0
radial_qc_average_radial_bearing_max = 305.0
radial_input_folder_path = "/data/radials/TINO"
opendap_data_url = "https://thredds.example.org/dodsC/TINO_aggregated"

[[station]]
network_id = "HFR-Other"
station_id = "XXXX"

[[station]]
network_id = "HFR-TirLig"
station_id = "PCOR"
radial_qc_average_radial_bearing_min = 300.0
radial_qc_average_radial_bearing_max = 40.0
"#;

    #[test]
    fn test_stations_in_registry_order() {
        let registry = StationRegistry::from_toml_str(REGISTRY).unwrap();
        let stations = registry.stations_for_network("HFR-TirLig").unwrap();

        let ids: Vec<&str> = stations.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["TINO", "PCOR"]);
        assert_eq!(stations[0].qc_min, Some(125.0));
        assert_eq!(stations[0].qc_max, Some(305.0));
        assert_eq!(
            stations[0].radial_input_folder_path,
            Some(PathBuf::from("/data/radials/TINO"))
        );
        assert_eq!(stations[1].qc_min, Some(300.0));
        assert_eq!(stations[1].opendap_data_url, None);
    }

    #[test]
    fn test_unknown_network() {
        let registry = StationRegistry::from_toml_str(REGISTRY).unwrap();
        match registry.stations_for_network("HFR-Nowhere") {
            Err(AvrbError::NetworkNotFound { network_id }) => assert_eq!(network_id, "HFR-Nowhere"),
            other => panic!("Expected NetworkNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_network_without_stations() {
        let registry = StationRegistry::from_toml_str(REGISTRY).unwrap();
        assert!(registry.stations_for_network("HFR-Empty").unwrap().is_empty());
    }

    #[test]
    fn test_undeclared_network_with_stations() {
        let registry = StationRegistry::from_toml_str(REGISTRY).unwrap();
        let stations = registry.stations_for_network("HFR-Other").unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].qc_min, None);
    }

    #[test]
    fn test_duplicate_station_rejected() {
        let text = r#"
[[station]]
network_id = "N"
station_id = "A"

[[station]]
network_id = "N"
station_id = "A"
"#;
        assert!(matches!(
            StationRegistry::from_toml_str(text),
            Err(AvrbError::Registry { .. })
        ));
    }

    #[test]
    fn test_unnamed_station_keeps_siblings() {
        let text = r#"
[[station]]
network_id = "N"
station_id = "A"

[[station]]
network_id = "N"
radial_qc_average_radial_bearing_min = 10.0

[[station]]
network_id = "N"

[[station]]
network_id = "N"
station_id = "B"
"#;
        let registry = StationRegistry::from_toml_str(text).unwrap();
        let stations = registry.stations_for_network("N").unwrap();

        let ids: Vec<&str> = stations.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "", "", "B"]);
        assert_eq!(stations[1].qc_min, Some(10.0));
    }

    #[test]
    fn test_invalid_toml_is_registry_error() {
        assert!(matches!(
            StationRegistry::from_toml_str("[[station]\nnetwork_id = "),
            Err(AvrbError::Registry { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stations.toml");
        fs::write(&path, REGISTRY).unwrap();

        let registry = StationRegistry::from_file(&path).unwrap();
        assert_eq!(registry.networks().len(), 2);
        assert_eq!(registry.station_count(), 3);
        assert_eq!(registry.source(), Some(path.as_path()));
        assert_eq!(
            registry.network("HFR-TirLig").unwrap().name.as_deref(),
            Some("Tirreno-Ligure")
        );
    }

    #[test]
    fn test_missing_file_is_registry_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = StationRegistry::from_file(&temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(AvrbError::Registry { .. })));
    }
}
