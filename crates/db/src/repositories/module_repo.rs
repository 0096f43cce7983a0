//! Repository for the `modules` table.

use coursetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::module::{CreateModule, Module};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, title, description, order_index, created_at, updated_at";

/// Provides provisioning and lookup for course modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a new module, returning the created row.
    ///
    /// Fails with a `uq_modules_course_order` violation if the course already
    /// has a module at `order_index`.
    pub async fn create(pool: &PgPool, input: &CreateModule) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules (course_id, title, description, order_index)
             VALUES ($1, $2, COALESCE($3, ''), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.order_index)
            .fetch_one(pool)
            .await
    }

    /// Find a module by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a module with the given ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM modules WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List a course's modules ordered by `order_index`.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules WHERE course_id = $1 ORDER BY order_index"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// IDs of a course's modules ordered by `order_index`.
    ///
    /// Empty when the course has no modules or does not exist.
    pub async fn list_ids_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM modules WHERE course_id = $1 ORDER BY order_index",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
