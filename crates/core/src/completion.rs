//! Per-(user, module) completion state machine and batch bookkeeping.
//!
//! A module is either `Incomplete` (no record) or `Complete` (a record with
//! a timestamp). Both transitions are idempotent: repeating one is a no-op.
//! Un-completing discards the timestamp, so completing again stamps a new one.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Completion state of one module for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    #[default]
    Incomplete,
    Complete { completed_at: Timestamp },
}

/// Whether an operation changed state or was a self-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    NoOp,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl CompletionState {
    /// Build the state from an optional stored completion timestamp.
    pub fn from_record(completed_at: Option<Timestamp>) -> Self {
        match completed_at {
            Some(completed_at) => Self::Complete { completed_at },
            None => Self::Incomplete,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        match self {
            Self::Complete { completed_at } => Some(*completed_at),
            Self::Incomplete => None,
        }
    }

    /// `Incomplete -> Complete` stamped with `now`; no-op when already complete.
    pub fn mark_complete(&mut self, now: Timestamp) -> Transition {
        match self {
            Self::Complete { .. } => Transition::NoOp,
            Self::Incomplete => {
                *self = Self::Complete { completed_at: now };
                Transition::Applied
            }
        }
    }

    /// `Complete -> Incomplete`; no-op when already incomplete.
    pub fn mark_incomplete(&mut self) -> Transition {
        match self {
            Self::Incomplete => Transition::NoOp,
            Self::Complete { .. } => {
                *self = Self::Incomplete;
                Transition::Applied
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Batch summary
// ---------------------------------------------------------------------------

/// Whether a failed store operation can succeed when repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connectivity, pool exhaustion, or a conflict the store asks to retry.
    Transient,
    /// Anything else; repeating the request gives the same result.
    Permanent,
}

/// Outcome of marking every module in a course complete.
///
/// Each module is an independent idempotent upsert, so a failure on one
/// module leaves the others applied. Failures are collected rather than
/// aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchCompletion {
    pub course_id: DbId,
    pub total_modules: usize,
    pub newly_completed: usize,
    pub already_completed: usize,
    pub failed_module_ids: Vec<DbId>,
    #[serde(skip)]
    permanent_failures: usize,
}

impl BatchCompletion {
    pub fn new(course_id: DbId, total_modules: usize) -> Self {
        Self {
            course_id,
            total_modules,
            ..Self::default()
        }
    }

    /// Record a successful upsert for one module.
    pub fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Applied => self.newly_completed += 1,
            Transition::NoOp => self.already_completed += 1,
        }
    }

    /// Record a module whose upsert failed.
    pub fn record_failure(&mut self, module_id: DbId, kind: FailureKind) {
        self.failed_module_ids.push(module_id);
        if kind == FailureKind::Permanent {
            self.permanent_failures += 1;
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_module_ids.is_empty()
    }

    /// Turn a batch with failures into an error.
    ///
    /// The error is `Unavailable` (retryable) only when every failure was
    /// transient; a single permanent failure makes it `Internal`.
    pub fn into_result(mut self) -> Result<Self, CoreError> {
        if self.is_success() {
            return Ok(self);
        }
        self.failed_module_ids.sort_unstable();
        let summary = format!(
            "{} of {} modules in course {} could not be marked complete",
            self.failed_module_ids.len(),
            self.total_modules,
            self.course_id
        );
        if self.permanent_failures > 0 {
            return Err(CoreError::Internal(format!(
                "{summary}; {} failed permanently (modules {:?})",
                self.permanent_failures, self.failed_module_ids
            )));
        }
        Err(CoreError::Unavailable(format!(
            "{summary}; the request is safe to retry"
        )))
    }
}
