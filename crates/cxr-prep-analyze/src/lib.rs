//! Duplicate detection for cxr-prep.
//!
//! This crate finds exact duplicate images inside each class of a dataset:
//!
//! - **Hashing** - full-content BLAKE3 fingerprint per file
//! - **Duplicate detection** - first occurrence in traversal order is the
//!   original, every later match is a duplicate
//! - **Per-class scanning** - one independent scan per class, merged into an
//!   ordered class-to-duplicates map
//! - **Reporting** - per-class pair counts with example previews
//!
//! ```rust,ignore
//! use cxr_prep_analyze::{DuplicateFinder, DuplicateReporter, scan_classes};
//!
//! let classes = vec!["NORMAL".to_string(), "PNEUMONIA".to_string()];
//! let finder = DuplicateFinder::new();
//! let duplicates = scan_classes(train_root, &classes, &finder, false)?;
//!
//! DuplicateReporter::new(3).render_classes(&duplicates, &mut std::io::stdout())?;
//! ```

mod classes;
mod duplicates;
mod hasher;
mod report;

pub use classes::{ClassDuplicates, scan_classes};
pub use duplicates::{
    DuplicateConfig, DuplicateConfigBuilder, DuplicateFinder, DuplicatePair, DuplicateScan,
};
pub use hasher::{hash_file, hash_file_sized, hash_reader};
pub use report::{DuplicateReporter, ReportOutcome};

// Re-export core types
pub use cxr_prep_core::{ContentHash, PrepError, RunTally};
