//! Query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /api/v1/courses` (`?status=`).
///
/// `status` is parsed into a
/// [`ProgressFilter`](coursetrack_core::progress::ProgressFilter) by the handler
/// so invalid values produce a validation error rather than a 400 from serde.
#[derive(Debug, Default, Deserialize)]
pub struct CourseListParams {
    pub status: Option<String>,
}
