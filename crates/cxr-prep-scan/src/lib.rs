//! Dataset tree walking for cxr-prep.
//!
//! This crate owns everything that reads the shape of a dataset directory:
//!
//! - **Image enumeration** via a serial, name-sorted jwalk traversal
//! - **Class discovery** from the subdirectories of the training split
//! - **Structure listing** with a per-directory cap on shown files
//! - **File-count statistics** bucketed into train and test, with a text chart
//!
//! # Example
//!
//! ```rust,no_run
//! use cxr_prep_scan::{ImageWalker, discover_classes};
//! use std::path::Path;
//!
//! let train = Path::new("dataset/chest_xray/train");
//! for class in discover_classes(train, &[]).unwrap() {
//!     let images = ImageWalker::default().collect(&train.join(&class)).unwrap();
//!     println!("{class}: {} images", images.len());
//! }
//! ```

mod stats;
mod structure;
mod walker;

pub use stats::{FileCountReport, count_files};
pub use structure::print_structure;
pub use walker::{ImageWalker, discover_classes, ensure_dir, walk_dir, walk_error};

// Re-export core types for convenience
pub use cxr_prep_core::{ImageExtensions, PrepError, Split};
