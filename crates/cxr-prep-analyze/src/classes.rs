//! Per-class duplicate scanning.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use cxr_prep_core::PrepError;

use crate::duplicates::{DuplicateFinder, DuplicateScan};

/// Duplicate scan results keyed by class, in class order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClassDuplicates {
    classes: IndexMap<String, DuplicateScan>,
}

impl ClassDuplicates {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the scan for a class.
    pub fn insert(&mut self, class: impl Into<String>, scan: DuplicateScan) -> Option<DuplicateScan> {
        self.classes.insert(class.into(), scan)
    }

    /// Scan result for one class.
    pub fn get(&self, class: &str) -> Option<&DuplicateScan> {
        self.classes.get(class)
    }

    /// Duplicate paths of one class.
    pub fn duplicates_for(&self, class: &str) -> Option<&BTreeSet<PathBuf>> {
        self.classes.get(class).map(|scan| &scan.duplicates)
    }

    /// Iterate classes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DuplicateScan)> {
        self.classes.iter().map(|(class, scan)| (class.as_str(), scan))
    }

    /// Class names in insertion order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no class has been scanned.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Duplicate pairs across all classes.
    pub fn total_pairs(&self) -> usize {
        self.classes.values().map(DuplicateScan::pair_count).sum()
    }

    /// Image files hashed across all classes.
    pub fn total_files(&self) -> u64 {
        self.classes.values().map(|scan| scan.files_hashed).sum()
    }
}

/// Run the finder once per class directory under `train_root`.
///
/// Results keep the order of `classes` whether or not the scans run on the
/// rayon pool. The first failing class aborts the whole scan.
pub fn scan_classes(
    train_root: &Path,
    classes: &[String],
    finder: &DuplicateFinder,
    parallel: bool,
) -> Result<ClassDuplicates, PrepError> {
    let scan_one = |class: &String| -> Result<(String, DuplicateScan), PrepError> {
        let scan = finder.find_duplicates(&train_root.join(class))?;
        info!(class = %class, pairs = scan.pair_count(), "class scanned");
        Ok((class.clone(), scan))
    };

    let results: Vec<(String, DuplicateScan)> = if parallel {
        classes.par_iter().map(scan_one).collect::<Result<_, PrepError>>()?
    } else {
        classes.iter().map(scan_one).collect::<Result<_, PrepError>>()?
    };

    let mut merged = ClassDuplicates::new();
    for (class, scan) in results {
        merged.insert(class, scan);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parallel_matches_sequential_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let classes: Vec<String> = ["PNEUMONIA", "NORMAL", "COVID"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for class in &classes {
            fs::create_dir(root.join(class)).unwrap();
            fs::write(root.join(class).join("1.jpeg"), class.as_bytes()).unwrap();
            fs::write(root.join(class).join("2.jpeg"), class.as_bytes()).unwrap();
        }

        let finder = DuplicateFinder::new();
        let sequential = scan_classes(root, &classes, &finder, false).unwrap();
        let parallel = scan_classes(root, &classes, &finder, true).unwrap();

        let seq_names: Vec<_> = sequential.class_names().collect();
        let par_names: Vec<_> = parallel.class_names().collect();
        assert_eq!(seq_names, vec!["PNEUMONIA", "NORMAL", "COVID"]);
        assert_eq!(seq_names, par_names);
        assert_eq!(parallel.total_pairs(), 3);
        assert_eq!(parallel.total_files(), 6);
    }

    #[test]
    fn test_missing_class_aborts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("NORMAL")).unwrap();
        let classes = vec!["NORMAL".to_string(), "MISSING".to_string()];

        let err = scan_classes(temp.path(), &classes, &DuplicateFinder::new(), false).unwrap_err();
        assert!(matches!(err, PrepError::NotADirectory { .. }));
    }
}
