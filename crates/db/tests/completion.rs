//! Integration tests for the completion mutator.
//!
//! Exercises idempotent mark-complete / mark-incomplete, the not-found
//! cases, mark-all batches (including partial failure), and concurrent
//! inserts on the same pair.

mod common;

use assert_matches::assert_matches;
use coursetrack_core::error::CoreError;
use coursetrack_db::repositories::{CompletionRepo, ModuleRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_complete_twice_keeps_one_record(pool: PgPool) {
    let user = common::create_user(&pool, "twice@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let module = common::create_module(&pool, course.id, "M1", 0).await;

    let first = CompletionRepo::mark_complete(&pool, user.id, module.id)
        .await
        .unwrap()
        .expect("module exists");
    assert!(first.changed);
    assert!(first.is_completed);
    assert!(first.completed_at.is_some());

    let second = CompletionRepo::mark_complete(&pool, user.id, module.id)
        .await
        .unwrap()
        .expect("module exists");
    assert!(!second.changed, "second completion must be a no-op");
    assert!(second.is_completed);
    assert_eq!(second.completed_at, first.completed_at);

    assert_eq!(common::completion_count(&pool, user.id, module.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_complete_missing_module_creates_nothing(pool: PgPool) {
    let user = common::create_user(&pool, "ghost@test.com").await;

    let result = CompletionRepo::mark_complete(&pool, user.id, 424_242).await.unwrap();
    assert!(result.is_none());

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM module_completions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total.0, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_incomplete_removes_record(pool: PgPool) {
    let user = common::create_user(&pool, "undo@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let module = common::create_module(&pool, course.id, "M1", 0).await;

    CompletionRepo::mark_complete(&pool, user.id, module.id).await.unwrap();

    let change = CompletionRepo::mark_incomplete(&pool, user.id, module.id)
        .await
        .unwrap();
    assert!(change.changed);
    assert!(!change.is_completed);
    assert_eq!(change.completed_at, None);

    assert!(CompletionRepo::find(&pool, user.id, module.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_incomplete_without_record_is_noop(pool: PgPool) {
    let user = common::create_user(&pool, "noop@test.com").await;

    // Neither the record nor even the module needs to exist.
    let change = CompletionRepo::mark_incomplete(&pool, user.id, 77).await.unwrap();
    assert!(!change.changed);
    assert!(!change.is_completed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recomplete_gets_new_later_timestamp(pool: PgPool) {
    let user = common::create_user(&pool, "again@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let module = common::create_module(&pool, course.id, "M1", 0).await;

    let first = CompletionRepo::mark_complete(&pool, user.id, module.id)
        .await
        .unwrap()
        .unwrap();
    CompletionRepo::mark_incomplete(&pool, user.id, module.id).await.unwrap();
    let again = CompletionRepo::mark_complete(&pool, user.id, module.id)
        .await
        .unwrap()
        .unwrap();

    assert!(again.changed);
    let (first_at, again_at) = (first.completed_at.unwrap(), again.completed_at.unwrap());
    assert!(again_at > first_at, "re-completion must stamp a new, later time");

    assert_eq!(common::completion_count(&pool, user.id, module.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_complete_counts_new_and_existing(pool: PgPool) {
    let user = common::create_user(&pool, "all@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let m0 = common::create_module(&pool, course.id, "M0", 0).await;
    let m1 = common::create_module(&pool, course.id, "M1", 1).await;
    let m2 = common::create_module(&pool, course.id, "M2", 2).await;

    let existing = CompletionRepo::mark_complete(&pool, user.id, m1.id)
        .await
        .unwrap()
        .unwrap();

    let batch = CompletionRepo::mark_all_complete(&pool, user.id, course.id)
        .await
        .unwrap()
        .expect("course has modules");

    assert_eq!(batch.course_id, course.id);
    assert_eq!(batch.total_modules, 3);
    assert_eq!(batch.newly_completed, 2);
    assert_eq!(batch.already_completed, 1);
    assert!(batch.is_success());

    for module in [&m0, &m1, &m2] {
        assert_eq!(common::completion_count(&pool, user.id, module.id).await, 1);
    }

    // The pre-existing record kept its timestamp.
    let kept = CompletionRepo::find(&pool, user.id, m1.id).await.unwrap().unwrap();
    assert_eq!(Some(kept.completed_at), existing.completed_at);

    // Running the batch again changes nothing.
    let rerun = CompletionRepo::mark_all_complete(&pool, user.id, course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rerun.newly_completed, 0);
    assert_eq!(rerun.already_completed, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_complete_empty_or_missing_course_is_none(pool: PgPool) {
    let user = common::create_user(&pool, "none@test.com").await;
    let empty = common::create_course(&pool, "Empty").await;

    assert_matches!(
        CompletionRepo::mark_all_complete(&pool, user.id, empty.id).await,
        Ok(None)
    );
    assert_matches!(
        CompletionRepo::mark_all_complete(&pool, user.id, 31_337).await,
        Ok(None)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_mark_complete_yields_single_row(pool: PgPool) {
    let user = common::create_user(&pool, "race@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let module = common::create_module(&pool, course.id, "M1", 0).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let (user_id, module_id) = (user.id, module.id);
        handles.push(tokio::spawn(async move {
            CompletionRepo::mark_complete(&pool, user_id, module_id).await
        }));
    }

    let mut applied = 0;
    for handle in handles {
        let change = handle
            .await
            .expect("task should not panic")
            .expect("concurrent insert must not error")
            .expect("module exists");
        assert!(change.is_completed);
        if change.changed {
            applied += 1;
        }
    }

    assert_eq!(applied, 1, "exactly one call performs the transition");
    assert_eq!(common::completion_count(&pool, user.id, module.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completions_are_scoped_to_user(pool: PgPool) {
    let alice = common::create_user(&pool, "alice2@test.com").await;
    let bob = common::create_user(&pool, "bob2@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let module = common::create_module(&pool, course.id, "M1", 0).await;

    CompletionRepo::mark_complete(&pool, alice.id, module.id).await.unwrap();
    // Bob un-completing the same module must not touch Alice's record.
    let change = CompletionRepo::mark_incomplete(&pool, bob.id, module.id).await.unwrap();
    assert!(!change.changed);

    assert_eq!(common::completion_count(&pool, alice.id, module.id).await, 1);
    assert!(ModuleRepo::find_by_id(&pool, module.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_complete_transient_failure_keeps_other_modules(pool: PgPool) {
    let user = common::create_user(&pool, "partial@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let ok = common::create_module(&pool, course.id, "M0", 0).await;
    let broken = common::create_module(&pool, course.id, "M1", 1).await;

    // 40001 = serialization_failure
    common::reject_completion_inserts(&pool, broken.id, "40001").await;

    let batch = CompletionRepo::mark_all_complete(&pool, user.id, course.id)
        .await
        .unwrap()
        .expect("course has modules");

    assert_eq!(batch.newly_completed, 1);
    assert_eq!(batch.failed_module_ids, vec![broken.id]);
    assert_eq!(common::completion_count(&pool, user.id, ok.id).await, 1);
    assert_eq!(common::completion_count(&pool, user.id, broken.id).await, 0);

    assert_matches!(
        batch.into_result(),
        Err(CoreError::Unavailable(msg)) if msg.contains("1 of 2") && msg.contains("retry")
    );

    // Once the store recovers, repeating the batch completes the remainder.
    common::accept_completion_inserts(&pool).await;
    let retry = CompletionRepo::mark_all_complete(&pool, user.id, course.id)
        .await
        .unwrap()
        .unwrap();
    assert!(retry.is_success());
    assert_eq!(retry.newly_completed, 1);
    assert_eq!(retry.already_completed, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_complete_permanent_failure_is_not_retryable(pool: PgPool) {
    let user = common::create_user(&pool, "permanent@test.com").await;
    let course = common::create_course(&pool, "Course").await;
    let ok = common::create_module(&pool, course.id, "M0", 0).await;
    let broken = common::create_module(&pool, course.id, "M1", 1).await;

    // P0001 = raise_exception
    common::reject_completion_inserts(&pool, broken.id, "P0001").await;

    let batch = CompletionRepo::mark_all_complete(&pool, user.id, course.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batch.failed_module_ids, vec![broken.id]);
    assert_eq!(common::completion_count(&pool, user.id, ok.id).await, 1);
    assert_matches!(
        batch.into_result(),
        Err(CoreError::Internal(msg)) if msg.contains("1 of 2") && !msg.contains("retry")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_complete_for_unknown_user_fails_permanently(pool: PgPool) {
    let course = common::create_course(&pool, "Course").await;
    common::create_module(&pool, course.id, "M0", 0).await;
    common::create_module(&pool, course.id, "M1", 1).await;

    // No users row: every insert violates the foreign key.
    let batch = CompletionRepo::mark_all_complete(&pool, 777_777, course.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batch.failed_module_ids.len(), 2);
    assert_matches!(batch.into_result(), Err(CoreError::Internal(_)));
}
