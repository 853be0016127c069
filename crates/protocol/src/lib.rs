mod report;
mod version;

pub use report::{EnergySummary, MeasurementReport, PlatformSummary, WorkloadSummary};
pub use version::{MIN_SUPPORTED_VERSION, REPORT_VERSION};
