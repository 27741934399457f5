//! Station failure tests

use super::*;
use crate::models::SourceType;
use std::time::Duration;

#[tokio::test]
async fn test_empty_directory_is_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    let radials = temp_dir.path().join("radials");
    fs::create_dir_all(&radials).unwrap();

    let renderer = Arc::new(RecordingRenderer::default());
    let analyzer = analyzer(&temp_dir, renderer.clone());
    let outcome = analyzer
        .analyze(&tabular_record("AAAA", &radials), SourceType::Tabular)
        .await;

    match outcome.result {
        Err(AvrbError::EmptyResult {
            network_id,
            station_id,
        }) => {
            assert_eq!(network_id, NETWORK);
            assert_eq!(station_id, "AAAA");
        }
        other => panic!("Expected EmptyResult, got {other:?}"),
    }
    assert_eq!(renderer.count(), 0);
}

#[tokio::test]
async fn test_only_malformed_files_is_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    let radials = temp_dir.path().join("radials");
    write_ruv(&radials, "a.ruv", "2021 04 14 11 00 00", &[]);
    fs::write(radials.join("b.ruv"), "%TableStart:\n1 2 3\n").unwrap();

    let analyzer = analyzer(&temp_dir, Arc::new(RecordingRenderer::default()));
    let outcome = analyzer
        .analyze(&tabular_record("AAAA", &radials), SourceType::Tabular)
        .await;
    assert!(matches!(outcome.result, Err(AvrbError::EmptyResult { .. })));
}

#[tokio::test]
async fn test_missing_directory_is_source_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let analyzer = analyzer(&temp_dir, Arc::new(RecordingRenderer::default()));
    let outcome = analyzer
        .analyze(&tabular_record("AAAA", &missing), SourceType::Tabular)
        .await;

    match outcome.result {
        Err(AvrbError::SourceNotFound { path }) => assert_eq!(path, missing),
        other => panic!("Expected SourceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_qc_bound_is_metadata_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let mut record = gridded_record("AAAA");
    record.qc_max = None;

    let analyzer = analyzer(&temp_dir, Arc::new(RecordingRenderer::default()));
    let outcome = analyzer.analyze(&record, SourceType::Gridded).await;

    match outcome.result {
        Err(AvrbError::MetadataUnavailable { station_id, field }) => {
            assert_eq!(station_id, "AAAA");
            assert_eq!(field, "radial_qc_average_radial_bearing_max");
        }
        other => panic!("Expected MetadataUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_locator_must_match_source_type() {
    let temp_dir = TempDir::new().unwrap();
    let analyzer = analyzer(&temp_dir, Arc::new(RecordingRenderer::default()));

    let outcome = analyzer
        .analyze(&gridded_record("AAAA"), SourceType::Tabular)
        .await;
    assert!(matches!(
        outcome.result,
        Err(AvrbError::MetadataUnavailable { ref field, .. }) if field == "radial_input_folder_path"
    ));
}

#[tokio::test]
async fn test_unreachable_dataset_is_remote_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let opener: Arc<dyn DatasetOpener> =
        Arc::new(|address: &str| -> Result<Box<dyn GriddedDataset>> {
            Err(AvrbError::remote_unavailable(address, "connection refused"))
        });
    let analyzer = StationAnalyzer::with_components(
        test_config(&temp_dir),
        Arc::new(RecordingRenderer::default()),
        opener,
    )
    .unwrap();

    let outcome = analyzer
        .analyze(&gridded_record("AAAA"), SourceType::Gridded)
        .await;
    match outcome.result {
        Err(AvrbError::RemoteSourceUnavailable { address, .. }) => assert_eq!(address, ADDRESS),
        other => panic!("Expected RemoteSourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_dataset_read_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let opener: Arc<dyn DatasetOpener> =
        Arc::new(|_: &str| -> Result<Box<dyn GriddedDataset>> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(Box::new(memory_dataset()))
        });
    let analyzer = StationAnalyzer::with_components(
        test_config(&temp_dir),
        Arc::new(RecordingRenderer::default()),
        opener,
    )
    .unwrap()
    .with_remote_timeout(Duration::from_millis(50));

    let outcome = analyzer
        .analyze(&gridded_record("AAAA"), SourceType::Gridded)
        .await;
    assert!(matches!(
        outcome.result,
        Err(AvrbError::RemoteTimeout { ref address, .. }) if address == ADDRESS
    ));
}

#[tokio::test]
async fn test_render_failure_fails_station() {
    let temp_dir = TempDir::new().unwrap();
    let analyzer = analyzer(&temp_dir, Arc::new(FailingRenderer));

    let outcome = analyzer
        .analyze(&gridded_record("AAAA"), SourceType::Gridded)
        .await;
    assert!(matches!(outcome.result, Err(AvrbError::RenderFailed { .. })));
}

#[test]
fn test_invalid_config_is_rejected_before_analysis() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.output.histogram_bin_width = 0.0;

    let result = StationAnalyzer::with_components(
        config.clone(),
        Arc::new(RecordingRenderer::default()),
        memory_opener(),
    );
    assert!(matches!(result, Err(AvrbError::Configuration { .. })));
    assert!(matches!(
        StationAnalyzer::new(config),
        Err(AvrbError::Configuration { .. })
    ));
}
