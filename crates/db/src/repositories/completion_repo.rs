//! Repository for the `module_completions` table.
//!
//! All mutations are idempotent and scoped to one user. Inserts rely on the
//! `uq_module_completions_user_module` constraint with `ON CONFLICT DO NOTHING`,
//! so concurrent completions of the same pair never create a second row and
//! never surface a uniqueness error.

use coursetrack_core::completion::{BatchCompletion, CompletionState, FailureKind, Transition};
use coursetrack_core::types::{DbId, Timestamp};
use futures::{stream, StreamExt};
use sqlx::PgPool;

use crate::models::completion::{CompletionChange, ModuleCompletion};
use crate::repositories::ModuleRepo;

/// Upper bound on in-flight upserts during a mark-all batch.
const MAX_CONCURRENT_UPSERTS: usize = 8;

/// Provides completion state transitions for a user's modules.
pub struct CompletionRepo;

impl CompletionRepo {
    /// Find the completion record for a (user, module) pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<Option<ModuleCompletion>, sqlx::Error> {
        sqlx::query_as::<_, ModuleCompletion>(
            "SELECT id, user_id, module_id, completed_at \
             FROM module_completions \
             WHERE user_id = $1 AND module_id = $2",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(pool)
        .await
    }

    /// Ensure the user has a completion record for the module.
    ///
    /// Returns `None` if the module does not exist (no record is created).
    /// An existing record is left untouched, keeping its original timestamp.
    pub async fn mark_complete(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<Option<CompletionChange>, sqlx::Error> {
        if !ModuleRepo::exists(pool, module_id).await? {
            return Ok(None);
        }

        let (state, transition) = Self::insert_if_absent(pool, user_id, module_id).await?;
        Ok(Some(CompletionChange::new(module_id, state, transition)))
    }

    /// Remove the user's completion record for the module, if any.
    ///
    /// Absence is not an error. The old timestamp is discarded.
    pub async fn mark_incomplete(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<CompletionChange, sqlx::Error> {
        let deleted = sqlx::query_scalar::<_, Timestamp>(
            "DELETE FROM module_completions \
             WHERE user_id = $1 AND module_id = $2 \
             RETURNING completed_at",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(pool)
        .await?;

        let mut state = CompletionState::from_record(deleted);
        let transition = state.mark_incomplete();
        Ok(CompletionChange::new(module_id, state, transition))
    }

    /// Mark every module of a course complete for the user.
    ///
    /// Returns `None` when the course has no modules or does not exist.
    /// Each module is an independent upsert; a failed module is recorded in
    /// the returned [`BatchCompletion`], tagged transient or permanent, and
    /// does not stop the others.
    pub async fn mark_all_complete(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<BatchCompletion>, sqlx::Error> {
        let module_ids = ModuleRepo::list_ids_for_course(pool, course_id).await?;
        if module_ids.is_empty() {
            return Ok(None);
        }

        let mut batch = BatchCompletion::new(course_id, module_ids.len());

        let results: Vec<_> = stream::iter(module_ids)
            .map(move |module_id| async move {
                let result = Self::insert_if_absent(pool, user_id, module_id).await;
                (module_id, result)
            })
            .buffer_unordered(MAX_CONCURRENT_UPSERTS)
            .collect()
            .await;

        for (module_id, result) in results {
            match result {
                Ok((_, transition)) => batch.record(transition),
                Err(e) => {
                    let kind = if crate::is_transient(&e) {
                        FailureKind::Transient
                    } else {
                        FailureKind::Permanent
                    };
                    tracing::warn!(
                        user_id,
                        course_id,
                        module_id,
                        ?kind,
                        error = %e,
                        "Failed to mark module complete in batch"
                    );
                    batch.record_failure(module_id, kind);
                }
            }
        }

        Ok(Some(batch))
    }

    /// Conflict-safe insert of one completion record.
    ///
    /// The returned state is `Complete` with the stored timestamp, unless the
    /// record was deleted between the conflicting insert and the read-back.
    async fn insert_if_absent(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<(CompletionState, Transition), sqlx::Error> {
        let inserted = sqlx::query_scalar::<_, Timestamp>(
            "INSERT INTO module_completions (user_id, module_id) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id, module_id) DO NOTHING \
             RETURNING completed_at",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(pool)
        .await?;

        if let Some(completed_at) = inserted {
            let mut state = CompletionState::Incomplete;
            let transition = state.mark_complete(completed_at);
            return Ok((state, transition));
        }

        let existing = Self::find(pool, user_id, module_id).await?;
        let state = CompletionState::from_record(existing.map(|c| c.completed_at));
        Ok((state, Transition::NoOp))
    }
}
