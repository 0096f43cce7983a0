//! Module entity, provisioning DTO, and per-user module view.

use coursetrack_core::completion::CompletionState;
use coursetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a module inside a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateModule {
    pub course_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
}

/// Row shape of the module/completion join for one user.
#[derive(Debug, Clone, FromRow)]
pub struct ModuleProgressRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub completed_at: Option<Timestamp>,
}

/// A module annotated with whether the user has completed it.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleProgress {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl From<ModuleProgressRow> for ModuleProgress {
    fn from(row: ModuleProgressRow) -> Self {
        let state = CompletionState::from_record(row.completed_at);
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            order_index: row.order_index,
            is_completed: state.is_completed(),
            completed_at: state.completed_at(),
        }
    }
}
