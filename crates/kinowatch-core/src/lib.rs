//! Core aggregation + change-detection pipeline for kinowatch.
//!
//! This crate is intentionally framework-agnostic. Listing sites and the
//! browser renderer live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod cycle;
pub mod domain;
pub mod errors;
pub mod fetch;
pub mod listings;
pub mod logging;
pub mod seen;
pub mod titles;

pub use errors::{Error, Result};
