use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use jetpower_protocol::*;
use pretty_assertions::assert_eq;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("fixtures")
}

fn reports_dir() -> PathBuf {
    fixtures_dir().join("reports")
}

fn read_report(name: &str) -> MeasurementReport {
    let path = reports_dir().join(format!("{}.json", name));
    let content =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("Invalid fixture {:?}: {}", path, e))
}

fn sample_command_report() -> MeasurementReport {
    MeasurementReport::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        WorkloadSummary {
            command: ["stress", "--cpu", "6", "-t", "5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_code: Some(0),
        },
        PlatformSummary {
            topology: "orin".to_string(),
            channels: 3,
            sampling_rate_hz: 30.0,
        },
        4250.0,
        EnergySummary::new(52_500.0, 31_250.0, 5.0, 148),
        5.03125,
        Some(11_750.0),
    )
}

fn sample_signaled_report() -> MeasurementReport {
    MeasurementReport::new(
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 15, 0).unwrap(),
        WorkloadSummary {
            command: ["./benchmark", "--iterations", "100"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_code: None,
        },
        PlatformSummary {
            topology: "legacy".to_string(),
            channels: 3,
            sampling_rate_hz: 20.0,
        },
        3000.0,
        EnergySummary::new(9000.0, 3000.0, 2.0, 40),
        2.05,
        Some(5000.0),
    )
}

#[test]
fn command_fixture_matches_sample() {
    assert_eq!(read_report("command"), sample_command_report());
}

#[test]
fn signaled_fixture_matches_sample() {
    let report = read_report("signaled_command");

    assert_eq!(report, sample_signaled_report());
    assert!(report.is_supported_version());
    assert_eq!(report.workload.exit_code, None);
    assert_eq!(report.energy.average_power_mw(), Some(4500.0));
}

#[test]
fn serialized_sample_matches_fixture_json() {
    let path = reports_dir().join("command.json");
    let fixture: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let generated = serde_json::to_value(sample_command_report()).unwrap();

    assert_eq!(generated, fixture);
}

#[test]
fn verify_report_fixtures_deserialize() {
    let dir = reports_dir();

    for entry in fs::read_dir(&dir).expect("Failed to read reports directory") {
        let entry = entry.unwrap();
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            let content = fs::read_to_string(&path).unwrap();
            let result: Result<MeasurementReport, _> = serde_json::from_str(&content);
            assert!(
                result.is_ok(),
                "Failed to deserialize {:?}: {:?}",
                path,
                result.err()
            );
        }
    }
}
