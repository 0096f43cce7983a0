//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod completion_repo;
pub mod course_repo;
pub mod module_repo;
pub mod progress_repo;
pub mod user_repo;

pub use completion_repo::CompletionRepo;
pub use course_repo::CourseRepo;
pub use module_repo::ModuleRepo;
pub use progress_repo::ProgressRepo;
pub use user_repo::UserRepo;
