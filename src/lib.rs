//! Objekt record persistence and background job dispatch.
//!
//! The crate exposes a persisted `Objekt` record whose dispatch methods
//! submit the record as payload to named background job types, plus the
//! in-process queue runtime that executes those jobs with their declared
//! retry policies.

pub mod background_jobs;
pub mod config;
pub mod objekt;
pub mod server_store;
