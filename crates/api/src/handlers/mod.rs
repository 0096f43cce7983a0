pub mod auth;
pub mod courses;
