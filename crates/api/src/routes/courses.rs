//! Route definitions for course progress and module completion.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Routes mounted at `/courses`. All require authentication.
///
/// ```text
/// GET    /                              -> list_courses
/// GET    /{course_id}                   -> get_course
/// POST   /{course_id}/complete-all      -> mark_all_complete
/// POST   /modules/{module_id}/complete  -> mark_module_complete
/// DELETE /modules/{module_id}/complete  -> mark_module_incomplete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses))
        .route("/{course_id}", get(courses::get_course))
        .route("/{course_id}/complete-all", post(courses::mark_all_complete))
        .route(
            "/modules/{module_id}/complete",
            post(courses::mark_module_complete).delete(courses::mark_module_incomplete),
        )
}
