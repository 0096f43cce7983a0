//! Domain rules for course progress tracking.
//!
//! Everything here is pure: no database or HTTP types. The `db` crate
//! persists completion records and the `api` crate exposes them, but the
//! rules for how completions roll up into progress live in this crate.

pub mod completion;
pub mod error;
pub mod progress;
pub mod types;
