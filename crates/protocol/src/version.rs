//! Versioning for serialized measurement reports.
//!
//! # Breaking Changes (require REPORT_VERSION bump)
//!
//! - Removing or renaming fields
//! - Changing field types or units
//!
//! # Non-Breaking Changes (safe without version bump)
//!
//! - Adding new optional fields with `#[serde(default)]`

/// Current report format version. Bump when making breaking changes.
pub const REPORT_VERSION: u32 = 1;

/// Oldest report version this build can still read.
pub const MIN_SUPPORTED_VERSION: u32 = 1;
