//! facelens-api — reqwest implementation of the backend contract.
//!
//! One `ApiClient` per process, cheap to clone. Every request carries the
//! client-wide timeout so a hung backend can never leave the UI busy
//! forever.

pub mod client;

pub use client::{ApiClient, DEFAULT_BASE_URL};
