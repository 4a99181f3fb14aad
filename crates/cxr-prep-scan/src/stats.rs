//! Per-directory file counts split into train and test.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use cxr_prep_core::{PrepError, Split, has_ignored_component};

use crate::walker::{ensure_dir, walk_dir, walk_error};

/// File counts for every directory that holds at least `min_files` files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileCountReport {
    /// Threshold used when the report was built.
    pub min_files: usize,
    /// Directories classified as training data.
    pub train: BTreeMap<PathBuf, usize>,
    /// Directories classified as test data.
    pub test: BTreeMap<PathBuf, usize>,
}

impl FileCountReport {
    /// Check if no directory passed the threshold.
    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Counts for one split.
    pub fn split(&self, split: Split) -> &BTreeMap<PathBuf, usize> {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    /// Total files in one split.
    pub fn total(&self, split: Split) -> usize {
        self.split(split).values().sum()
    }

    /// Test/train file ratio, when both splits are present.
    pub fn test_train_ratio(&self) -> Option<f64> {
        let train = self.total(Split::Train);
        if self.test.is_empty() || train == 0 {
            return None;
        }
        Some(self.total(Split::Test) as f64 / train as f64)
    }

    /// Chart rows for one split, largest first.
    pub fn rows(&self, split: Split) -> Vec<(String, usize)> {
        let mut rows: Vec<(String, usize)> = self
            .split(split)
            .iter()
            .map(|(path, count)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                (format!("{split}/{name}"), *count)
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    /// Write a text bar chart followed by summary statistics.
    pub fn render<W: Write>(&self, out: &mut W, bar_width: usize) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No folders with {}+ files to display.", self.min_files);
        }

        let rows: Vec<(String, usize)> = self
            .rows(Split::Train)
            .into_iter()
            .chain(self.rows(Split::Test))
            .collect();
        let max_count = rows.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
        let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

        writeln!(out, "File distribution by folder (train/test)")?;
        for (label, count) in &rows {
            let ratio = *count as f64 / max_count as f64;
            writeln!(
                out,
                " {label:<label_width$} {count:>8} {}",
                make_bar(ratio, bar_width)
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Statistics:")?;
        if !self.train.is_empty() {
            writeln!(
                out,
                "Train: {} folders, {} files",
                self.train.len(),
                self.total(Split::Train)
            )?;
        }
        if !self.test.is_empty() {
            writeln!(
                out,
                "Test: {} folders, {} files",
                self.test.len(),
                self.total(Split::Test)
            )?;
        }
        if let Some(ratio) = self.test_train_ratio() {
            writeln!(out, "Test/train ratio: {ratio:.2}")?;
        }
        Ok(())
    }
}

/// Count direct file children of every directory under `root`.
///
/// Directories with an ignored path component are skipped, as are those
/// holding fewer than `min_files` files. A directory is test data when its
/// path from `root`'s parent contains `test`, so folders above the root
/// never affect the split.
pub fn count_files(
    root: &Path,
    min_files: usize,
    ignored_dirs: &[String],
) -> Result<FileCountReport, PrepError> {
    ensure_dir(root)?;

    let mut counts: HashMap<PathBuf, usize> = HashMap::new();
    for entry in walk_dir(root, true) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let parent = entry.parent_path();
        if has_ignored_component(parent, ignored_dirs) {
            continue;
        }
        *counts.entry(parent.to_path_buf()).or_default() += 1;
    }

    // Only the root's own name and what lies below it decide the split.
    let base = root.parent().unwrap_or(root);
    let mut report = FileCountReport {
        min_files,
        ..FileCountReport::default()
    };
    for (dir, count) in counts {
        if count < min_files {
            continue;
        }
        let relative = dir.strip_prefix(base).unwrap_or(dir.as_path());
        match Split::of_path(relative) {
            Split::Train => report.train.insert(dir, count),
            Split::Test => report.test.insert(dir, count),
        };
    }

    Ok(report)
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
