pub mod auth;
pub mod courses;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user (requires auth)
///
/// /courses                                         list with progress (?status=)
/// /courses/{course_id}                             detail with ordered modules
/// /courses/{course_id}/complete-all                mark every module complete (POST)
/// /courses/modules/{module_id}/complete            mark complete (POST), incomplete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, me).
        .nest("/auth", auth::router())
        // Course progress and module completion.
        .nest("/courses", courses::router())
}
