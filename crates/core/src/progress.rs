//! Course progress aggregation rules.
//!
//! The percentage formula is shared by the course list and the course
//! detail views. Both go through [`ProgressSummary::from_counts`] so the two
//! can never disagree about rounding or the zero-module case.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid progress status strings.
pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

/// Filter value that matches every course.
pub const FILTER_ALL: &str = "all";

/// All valid filter strings accepted by the course list.
pub const VALID_FILTERS: &[&str] = &[
    FILTER_ALL,
    STATUS_NOT_STARTED,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
];

/// Hundredths of a percent in a whole course.
const BASIS_POINTS: i64 = 10_000;

// ---------------------------------------------------------------------------
// Percentage
// ---------------------------------------------------------------------------

/// Percentage of completed modules, rounded half-up to two decimals.
///
/// Returns `0.0` when `total` is zero or negative. Rounding is done in
/// integer basis points so values like 1/160 come out as `0.63`, the same
/// as a `NUMERIC` round in the database would give.
pub fn progress_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let completed = completed.clamp(0, total);
    let basis_points = (completed * BASIS_POINTS * 2 + total) / (total * 2);
    basis_points as f64 / 100.0
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Where a user stands in a course, derived from integer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Classify a course from its module counts.
    ///
    /// A course with zero modules is `NotStarted`: there is nothing to finish.
    pub fn from_counts(completed: i64, total: i64) -> Self {
        if completed <= 0 || total <= 0 {
            Self::NotStarted
        } else if completed >= total {
            Self::Completed
        } else {
            Self::InProgress
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Module counts for one user in one course, with the derived percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_modules: i64,
    pub completed_modules: i64,
    pub progress_percentage: f64,
    pub status: ProgressStatus,
}

impl ProgressSummary {
    pub fn from_counts(completed: i64, total: i64) -> Self {
        Self {
            total_modules: total,
            completed_modules: completed,
            progress_percentage: progress_percentage(completed, total),
            status: ProgressStatus::from_counts(completed, total),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Course list filter, mirroring the dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressFilter {
    #[default]
    All,
    Only(ProgressStatus),
}

impl ProgressFilter {
    /// Parse a query-string value. Hyphenated forms (`in-progress`) are
    /// accepted alongside the snake_case ones.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.trim().replace('-', "_").as_str() {
            FILTER_ALL | "" => Ok(Self::All),
            STATUS_NOT_STARTED => Ok(Self::Only(ProgressStatus::NotStarted)),
            STATUS_IN_PROGRESS => Ok(Self::Only(ProgressStatus::InProgress)),
            STATUS_COMPLETED => Ok(Self::Only(ProgressStatus::Completed)),
            _ => Err(CoreError::Validation(format!(
                "Invalid status filter '{s}'. Must be one of: {}",
                VALID_FILTERS.join(", ")
            ))),
        }
    }

    pub fn matches(&self, summary: &ProgressSummary) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => summary.status == *status,
        }
    }
}
