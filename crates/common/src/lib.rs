//! Wiscreen Common Utilities
//!
//! Shared infrastructure for all Wiscreen crates:
//! - Error types and result aliases
//! - Key-value preference stores
//! - Detector feed loading
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod prefs;

pub use config::*;
pub use error::*;
pub use prefs::*;
