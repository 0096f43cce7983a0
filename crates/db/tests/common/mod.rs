//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use coursetrack_db::models::course::{Course, CreateCourse};
use coursetrack_db::models::module::{CreateModule, Module};
use coursetrack_db::models::user::{CreateUser, User};
use coursetrack_db::repositories::{CourseRepo, ModuleRepo, UserRepo};
use sqlx::PgPool;

pub async fn create_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

pub async fn create_course(pool: &PgPool, title: &str) -> Course {
    let input = CreateCourse {
        title: title.to_string(),
        description: Some(format!("About {title}")),
    };
    CourseRepo::create(pool, &input)
        .await
        .expect("course creation should succeed")
}

pub async fn create_module(pool: &PgPool, course_id: i64, title: &str, order_index: i32) -> Module {
    let input = CreateModule {
        course_id,
        title: title.to_string(),
        description: None,
        order_index,
    };
    ModuleRepo::create(pool, &input)
        .await
        .expect("module creation should succeed")
}

/// Number of completion rows for a (user, module) pair.
pub async fn completion_count(pool: &PgPool, user_id: i64, module_id: i64) -> i64 {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM module_completions WHERE user_id = $1 AND module_id = $2",
    )
    .bind(user_id)
    .bind(module_id)
    .fetch_one(pool)
    .await
    .unwrap();
    count.0
}

/// Make every completion insert for `module_id` raise with the given SQLSTATE.
pub async fn reject_completion_inserts(pool: &PgPool, module_id: i64, sqlstate: &str) {
    let function = format!(
        "CREATE OR REPLACE FUNCTION reject_completion_insert() RETURNS trigger AS $$
         BEGIN
             IF NEW.module_id = {module_id} THEN
                 RAISE EXCEPTION 'completion insert rejected' USING ERRCODE = '{sqlstate}';
             END IF;
             RETURN NEW;
         END;
         $$ LANGUAGE plpgsql"
    );
    sqlx::query(&function).execute(pool).await.unwrap();
    sqlx::query(
        "CREATE TRIGGER trg_reject_completion_insert
         BEFORE INSERT ON module_completions
         FOR EACH ROW EXECUTE FUNCTION reject_completion_insert()",
    )
    .execute(pool)
    .await
    .unwrap();
}

/// Remove the trigger installed by [`reject_completion_inserts`].
pub async fn accept_completion_inserts(pool: &PgPool) {
    sqlx::query("DROP TRIGGER IF EXISTS trg_reject_completion_insert ON module_completions")
        .execute(pool)
        .await
        .unwrap();
}
