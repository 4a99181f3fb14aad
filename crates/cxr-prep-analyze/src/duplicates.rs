//! Exact duplicate detection using content hashing.
//!
//! Files are hashed in traversal order and indexed by fingerprint. The first
//! file seen for a fingerprint is the original; every later file with the
//! same fingerprint is a duplicate of it.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cxr_prep_core::{ContentHash, ImageExtensions, PrepError};
use cxr_prep_scan::ImageWalker;

use crate::hasher::hash_file_sized;

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Extensions of the files to consider.
    #[builder(default)]
    pub extensions: ImageExtensions,

    /// Walk directories in name order.
    #[builder(default = "true")]
    pub sorted: bool,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            extensions: ImageExtensions::default(),
            sorted: true,
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

/// A later file whose content matches an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// The redundant copy.
    pub duplicate: PathBuf,
    /// The first file seen with this content.
    pub original: PathBuf,
    /// Fingerprint shared by both files.
    pub hash: ContentHash,
}

/// Results from scanning one directory tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateScan {
    /// Pairs in the order the duplicates were found.
    pub pairs: Vec<DuplicatePair>,

    /// Every path classified as a duplicate.
    pub duplicates: BTreeSet<PathBuf>,

    /// Number of image files hashed.
    pub files_hashed: u64,

    /// Bytes read while hashing.
    pub bytes_hashed: u64,
}

impl DuplicateScan {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// Number of duplicate pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Check whether a path was classified as a duplicate.
    pub fn is_duplicate(&self, path: &Path) -> bool {
        self.duplicates.contains(path)
    }

    /// Number of distinct files (hashed minus duplicates).
    pub fn unique_count(&self) -> u64 {
        self.files_hashed - self.duplicates.len() as u64
    }
}

/// Duplicate file finder.
pub struct DuplicateFinder {
    config: DuplicateConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self {
            config: DuplicateConfig::default(),
        }
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// The finder's configuration.
    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Walk `root` and classify every image file by content.
    ///
    /// The first file that cannot be read aborts the scan.
    pub fn find_duplicates(&self, root: &Path) -> Result<DuplicateScan, PrepError> {
        let walker = ImageWalker::new(self.config.extensions.clone()).sorted(self.config.sorted);
        let mut index = FingerprintIndex::default();
        walker.walk(root, |path| index.observe(path))?;

        let scan = index.finish();
        info!(
            root = %root.display(),
            files = scan.files_hashed,
            duplicates = scan.duplicates.len(),
            "duplicate scan finished"
        );
        Ok(scan)
    }

    /// Classify an explicit list of paths, in the given order.
    ///
    /// Paths without an image extension are ignored.
    pub fn find_in_paths<I, P>(&self, paths: I) -> Result<DuplicateScan, PrepError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut index = FingerprintIndex::default();
        for path in paths {
            let path = path.into();
            if self.config.extensions.matches(&path) {
                index.observe(path)?;
            }
        }
        Ok(index.finish())
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint to first-seen path, built during one scan.
#[derive(Default)]
struct FingerprintIndex {
    first_seen: HashMap<ContentHash, PathBuf>,
    scan: DuplicateScan,
}

impl FingerprintIndex {
    fn observe(&mut self, path: PathBuf) -> Result<(), PrepError> {
        let (hash, len) = hash_file_sized(&path)?;
        self.scan.files_hashed += 1;
        self.scan.bytes_hashed += len;

        match self.first_seen.get(&hash) {
            Some(original) => {
                debug!(
                    duplicate = %path.display(),
                    original = %original.display(),
                    hash = %hash.short(),
                    "duplicate found"
                );
                self.scan.duplicates.insert(path.clone());
                self.scan.pairs.push(DuplicatePair {
                    duplicate: path,
                    original: original.clone(),
                    hash,
                });
            }
            None => {
                self.first_seen.insert(hash, path);
            }
        }
        Ok(())
    }

    fn finish(self) -> DuplicateScan {
        self.scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_files() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::write(root.join("a.jpg"), "same pixels").unwrap();
        fs::write(root.join("b.jpg"), "other pixels").unwrap();
        fs::write(root.join("c.jpg"), "same pixels").unwrap();
        fs::write(root.join("notes.txt"), "same pixels").unwrap();

        temp
    }

    #[test]
    fn test_first_occurrence_wins() {
        let temp = create_test_files();
        let root = temp.path();
        let finder = DuplicateFinder::new();

        let scan = finder
            .find_in_paths([root.join("c.jpg"), root.join("b.jpg"), root.join("a.jpg")])
            .unwrap();

        assert_eq!(scan.pair_count(), 1);
        assert_eq!(scan.pairs[0].duplicate, root.join("a.jpg"));
        assert_eq!(scan.pairs[0].original, root.join("c.jpg"));
        assert!(scan.is_duplicate(&root.join("a.jpg")));
        assert!(!scan.is_duplicate(&root.join("c.jpg")));
    }

    #[test]
    fn test_non_images_ignored() {
        let temp = create_test_files();
        let root = temp.path();

        let scan = DuplicateFinder::new()
            .find_in_paths([root.join("a.jpg"), root.join("notes.txt")])
            .unwrap();

        assert_eq!(scan.files_hashed, 1);
        assert!(!scan.has_duplicates());
    }

    #[test]
    fn test_three_copies_share_one_original() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["x1.png", "x2.png", "x3.png"] {
            fs::write(root.join(name), "identical").unwrap();
        }

        let scan = DuplicateFinder::new().find_duplicates(root).unwrap();

        assert_eq!(scan.files_hashed, 3);
        assert_eq!(scan.unique_count(), 1);
        assert!(scan.pairs.iter().all(|p| p.original == root.join("x1.png")));
    }
}
