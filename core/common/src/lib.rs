//! Common types shared across symcrypt crates.
//!
//! This crate holds the error taxonomy used by every encryption operation,
//! so that callers can match on failure kinds without depending on the
//! engine crate's internals.

pub mod error;

pub use error::{Error, Result};
