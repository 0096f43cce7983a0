//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use coursetrack_api::auth::jwt::{generate_access_token, JwtConfig};
use coursetrack_api::config::ServerConfig;
use coursetrack_api::router::build_app_router;
use coursetrack_api::state::AppState;
use coursetrack_db::models::course::{Course, CreateCourse};
use coursetrack_db::models::module::{CreateModule, Module};
use coursetrack_db::models::user::{CreateUser, User};
use coursetrack_db::repositories::{CourseRepo, ModuleRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user directly and mint a token for it.
pub async fn create_user_with_token(pool: &PgPool, email: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: "Learner".to_string(),
            password_hash: "unused".to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    let token =
        generate_access_token(user.id, &test_config().jwt).expect("token generation should succeed");
    (user, token)
}

pub async fn create_course(pool: &PgPool, title: &str) -> Course {
    CourseRepo::create(
        pool,
        &CreateCourse {
            title: title.to_string(),
            description: Some(format!("About {title}")),
        },
    )
    .await
    .expect("course creation should succeed")
}

pub async fn create_module(pool: &PgPool, course_id: i64, title: &str, order_index: i32) -> Module {
    ModuleRepo::create(
        pool,
        &CreateModule {
            course_id,
            title: title.to_string(),
            description: None,
            order_index,
        },
    )
    .await
    .expect("module creation should succeed")
}

/// Mint a token for an arbitrary user id, whether or not the user exists.
pub fn token_for(user_id: i64) -> String {
    generate_access_token(user_id, &test_config().jwt).expect("token generation should succeed")
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
