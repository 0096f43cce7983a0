//! Course entity, provisioning DTO, and progress views.

use coursetrack_core::progress::ProgressSummary;
use coursetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::module::ModuleProgress;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
}

/// Row shape of the course-list aggregate query.
///
/// Counts come back as `BIGINT`; the percentage is never computed in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct CourseProgressRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub total_modules: i64,
    pub completed_modules: i64,
}

/// A course annotated with one user's progress.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub id: DbId,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub progress: ProgressSummary,
}

impl From<CourseProgressRow> for CourseProgress {
    fn from(row: CourseProgressRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            progress: ProgressSummary::from_counts(row.completed_modules, row.total_modules),
        }
    }
}

/// A course with its ordered modules, each annotated for one user.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub id: DbId,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub progress: ProgressSummary,
    pub modules: Vec<ModuleProgress>,
}

impl CourseDetail {
    /// Assemble a detail view, deriving the counts from the module list itself.
    pub fn new(course: Course, modules: Vec<ModuleProgress>) -> Self {
        let total = modules.len() as i64;
        let completed = modules.iter().filter(|m| m.is_completed).count() as i64;
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            progress: ProgressSummary::from_counts(completed, total),
            modules,
        }
    }
}
