//! File operations for cxr-prep.
//!
//! This crate writes the cleaned dataset: it rebuilds class folders without
//! their duplicate images, mirrors the evaluation split verbatim, and fetches
//! and unpacks the source archive. All operations are synchronous and stop at
//! the first I/O failure.

mod archive;
mod conflict;
mod copy;
mod mirror;
mod progress;
mod rebuild;

#[cfg(feature = "download")]
pub use archive::{download_archive, fetch_archive};
pub use archive::{DownloadOutcome, ExtractStats, drive_url, extract_archive};
pub use conflict::ConflictPolicy;
pub use copy::{CopyStats, copy_file, copy_tree};
pub use mirror::{MirrorOutcome, mirror_split};
pub use progress::{ClassPhase, ClassTally, RebuildProgress};
pub use rebuild::{DatasetRebuilder, RebuildSummary};
