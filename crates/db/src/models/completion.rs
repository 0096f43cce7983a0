//! Completion record model and mutation result.

use coursetrack_core::completion::{CompletionState, Transition};
use coursetrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `module_completions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModuleCompletion {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: DbId,
    pub completed_at: Timestamp,
}

/// State of a (user, module) pair after a mutation, and whether the
/// mutation changed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionChange {
    pub module_id: DbId,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub changed: bool,
}

impl CompletionChange {
    pub fn new(module_id: DbId, state: CompletionState, transition: Transition) -> Self {
        Self {
            module_id,
            is_completed: state.is_completed(),
            completed_at: state.completed_at(),
            changed: transition.is_applied(),
        }
    }
}
