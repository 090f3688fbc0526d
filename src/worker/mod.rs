//! Operations available to code running inside a worker.
//!
//! Workers share most shapes with the application manager; those are
//! re-exported from [`crate::appmanager`] rather than redefined.

pub mod encryption;
pub mod metrics;
pub mod objectstore;
pub mod secrets;
