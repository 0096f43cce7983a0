//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (reference data and users)
//! - Explicit per-query row shapes and the API shapes they convert into

pub mod completion;
pub mod course;
pub mod module;
pub mod user;
