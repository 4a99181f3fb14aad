//! Rebuilding a dataset without its duplicate files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use cxr_prep_analyze::ClassDuplicates;
use cxr_prep_core::{ImageExtensions, PrepError, RunTally};
use cxr_prep_scan::ImageWalker;

use crate::copy::copy_file;
use crate::progress::{ClassPhase, ClassTally, RebuildProgress};

/// Result of a completed rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildSummary {
    /// Root of the cleaned tree.
    pub destination: PathBuf,
    /// Counters across all classes.
    pub tally: RunTally,
    /// Counters per class, in processing order.
    pub classes: Vec<ClassTally>,
}

/// Copies every non-duplicate image of each class into a new tree.
#[derive(Debug, Clone)]
pub struct DatasetRebuilder {
    walker: ImageWalker,
}

impl DatasetRebuilder {
    /// Create a rebuilder for the given image extensions.
    pub fn new(extensions: ImageExtensions) -> Self {
        Self {
            walker: ImageWalker::new(extensions),
        }
    }

    /// Rebuild without progress reporting.
    pub fn rebuild(
        &self,
        source_root: &Path,
        dest_root: &Path,
        classes: &[String],
        duplicates: &ClassDuplicates,
    ) -> Result<RebuildSummary, PrepError> {
        self.rebuild_with_progress(source_root, dest_root, classes, duplicates, |_| {})
    }

    /// Copy each class from `source_root` to `dest_root`, leaving out the
    /// paths in that class's duplicate set.
    ///
    /// Files keep their path relative to `source_root`. On failure the
    /// returned [`PrepError::RebuildAborted`] carries the tally of the work
    /// already on disk.
    pub fn rebuild_with_progress<F>(
        &self,
        source_root: &Path,
        dest_root: &Path,
        classes: &[String],
        duplicates: &ClassDuplicates,
        mut on_progress: F,
    ) -> Result<RebuildSummary, PrepError>
    where
        F: FnMut(&RebuildProgress),
    {
        let empty = BTreeSet::new();
        let mut tally = RunTally::new();
        let mut per_class = Vec::with_capacity(classes.len());

        for (done, class) in classes.iter().enumerate() {
            let mut report = |phase, classes_done, tally: &RunTally| {
                on_progress(&RebuildProgress {
                    class: class.clone(),
                    phase,
                    classes_done,
                    classes_total: classes.len(),
                    tally: *tally,
                });
            };
            report(ClassPhase::Started, done, &tally);

            let skip = duplicates.duplicates_for(class).unwrap_or(&empty);
            let mut class_tally = RunTally::new();
            let result = self.rebuild_class(source_root, dest_root, class, skip, &mut class_tally);
            tally.merge(&class_tally);

            if let Err(source) = result {
                return Err(PrepError::RebuildAborted {
                    tally,
                    source: Box::new(source),
                });
            }

            info!(
                class = %class,
                copied = class_tally.copied,
                skipped = class_tally.skipped,
                "class rebuilt"
            );
            report(ClassPhase::Finished, done + 1, &tally);
            per_class.push(ClassTally {
                class: class.clone(),
                tally: class_tally,
            });
        }

        Ok(RebuildSummary {
            destination: dest_root.to_path_buf(),
            tally,
            classes: per_class,
        })
    }

    fn rebuild_class(
        &self,
        source_root: &Path,
        dest_root: &Path,
        class: &str,
        skip: &BTreeSet<PathBuf>,
        tally: &mut RunTally,
    ) -> Result<(), PrepError> {
        let dest_class = dest_root.join(class);
        fs::create_dir_all(&dest_class).map_err(|e| PrepError::io(&dest_class, e))?;

        self.walker.walk(&source_root.join(class), |path| {
            if skip.contains(&path) {
                debug!(path = %path.display(), "skipping duplicate");
                tally.record_skip();
                return Ok(());
            }

            let relative = path.strip_prefix(source_root).unwrap_or(path.as_path());
            let target = dest_root.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
            }
            let bytes = copy_file(&path, &target)?;
            tally.record_copy(bytes);
            Ok(())
        })
    }
}

impl Default for DatasetRebuilder {
    fn default() -> Self {
        Self::new(ImageExtensions::default())
    }
}
