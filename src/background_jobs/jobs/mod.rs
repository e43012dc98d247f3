//! Specific background job implementations.
//!
//! This module contains implementations of the `BackgroundJob` trait for the
//! objekt record, plus the stable job-type identifiers the queue accepts.

pub mod objekt_no_retry;
pub mod objekt_retry;

pub use objekt_no_retry::ObjektNoRetryJob;
pub use objekt_retry::ObjektRetryJob;

/// Stable job-type identifiers accepted by the queue.
pub mod job_types {
    /// Executed by `ObjektNoRetryJob`.
    pub const OBJEKT_NO_RETRY: &str = "objekt_no_retry";

    /// Executed by `ObjektRetryJob`.
    pub const OBJEKT_RETRY: &str = "objekt_retry";

    /// Executor deployed outside this process. Only the identifier is
    /// stable here; submissions are accepted against it but no local
    /// executor exists.
    pub const OBJEKT_STANDARD_ERROR: &str = "objekt_standard_error";
}
