//! Core types and configuration for cxr-prep.
//!
//! This crate provides the data structures shared by the scanning, analysis
//! and copy crates: content fingerprints, the error taxonomy, the dataset
//! layout conventions and the run configuration.

mod config;
mod error;
mod hash;
mod layout;
mod tally;

pub use config::{PrepConfig, PrepConfigBuilder, PrepConfigBuilderError};
pub use error::{PrepError, Result};
pub use hash::ContentHash;
pub use layout::{ImageExtensions, Split, has_ignored_component};
pub use tally::RunTally;
