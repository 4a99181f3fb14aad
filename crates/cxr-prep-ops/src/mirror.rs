//! Verbatim copy of the held-out evaluation split.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use cxr_prep_core::PrepError;

use crate::conflict::ConflictPolicy;
use crate::copy::{CopyStats, copy_tree};

/// Outcome of mirroring a split directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorOutcome {
    /// The split was copied.
    Copied {
        source: PathBuf,
        destination: PathBuf,
        stats: CopyStats,
    },
    /// The split directory does not exist under the source root.
    NotFound { expected: PathBuf },
}

impl MirrorOutcome {
    /// Destination of the copy, if one happened.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Copied { destination, .. } => Some(destination),
            Self::NotFound { .. } => None,
        }
    }
}

/// Copy `<source_root>/<split_dir>` to `<dest_root>/<split_dir>` unchanged.
///
/// Every file is copied, images or not, and nothing is deduplicated. Existing
/// destination content is merged with; clashing files follow `policy`. A
/// missing split is reported and leaves the destination untouched.
pub fn mirror_split(
    source_root: &Path,
    dest_root: &Path,
    split_dir: &str,
    policy: ConflictPolicy,
) -> Result<MirrorOutcome, PrepError> {
    let source = source_root.join(split_dir);
    if !source.is_dir() {
        warn!(expected = %source.display(), "split directory not found, nothing mirrored");
        return Ok(MirrorOutcome::NotFound { expected: source });
    }

    let destination = dest_root.join(split_dir);
    let stats = copy_tree(&source, &destination, policy)?;
    info!(
        from = %source.display(),
        to = %destination.display(),
        files = stats.files,
        %policy,
        "split mirrored"
    );

    Ok(MirrorOutcome::Copied {
        source,
        destination,
        stats,
    })
}
