//! Progress aggregation over courses, modules, and completion records.
//!
//! Every call reads one point-in-time snapshot: the course list is a single
//! aggregate statement, and the course detail runs both of its reads inside
//! one `REPEATABLE READ` transaction. Counts come from SQL; the percentage is
//! always derived in Rust via [`ProgressSummary`](coursetrack_core::progress::ProgressSummary).

use coursetrack_core::progress::ProgressFilter;
use coursetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseDetail, CourseProgress, CourseProgressRow};
use crate::models::module::{ModuleProgress, ModuleProgressRow};

/// Provides read-only progress views for a single user.
pub struct ProgressRepo;

impl ProgressRepo {
    /// List every course with the user's module counts, ordered by course ID.
    ///
    /// Courses with no modules report zero totals and `0.0` percent. The
    /// filter is applied after aggregation, on the same snapshot.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: ProgressFilter,
    ) -> Result<Vec<CourseProgress>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CourseProgressRow>(
            "SELECT c.id, c.title, c.description, \
                    COUNT(m.id) AS total_modules, \
                    COUNT(mc.id) AS completed_modules \
             FROM courses c \
             LEFT JOIN modules m ON m.course_id = c.id \
             LEFT JOIN module_completions mc \
                    ON mc.module_id = m.id AND mc.user_id = $1 \
             GROUP BY c.id \
             ORDER BY c.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(CourseProgress::from)
            .filter(|course| filter.matches(&course.progress))
            .collect())
    }

    /// Load a course and its modules, each annotated for the user.
    ///
    /// Returns `None` if the course does not exist. Modules are ordered by
    /// `order_index`; the course-level counts are derived from that same list.
    pub async fn find_detail(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<CourseDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, created_at, updated_at \
             FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(course) = course else {
            return Ok(None);
        };

        let modules = sqlx::query_as::<_, ModuleProgressRow>(
            "SELECT m.id, m.title, m.description, m.order_index, mc.completed_at \
             FROM modules m \
             LEFT JOIN module_completions mc \
                    ON mc.module_id = m.id AND mc.user_id = $1 \
             WHERE m.course_id = $2 \
             ORDER BY m.order_index",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let modules = modules.into_iter().map(ModuleProgress::from).collect();
        Ok(Some(CourseDetail::new(course, modules)))
    }
}
