//! JWalk-based image enumeration.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::{DirEntry, Parallelism, WalkDir};
use tracing::debug;

use cxr_prep_core::{ImageExtensions, PrepError};

/// Enumerates image files below a root directory.
///
/// The walk is serial. With sorting enabled (the default) entries come out
/// depth-first with siblings ordered by name, which fixes the order in which
/// duplicates are attributed.
#[derive(Debug, Clone)]
pub struct ImageWalker {
    extensions: ImageExtensions,
    sorted: bool,
}

impl ImageWalker {
    /// Create a walker for the given extensions.
    pub fn new(extensions: ImageExtensions) -> Self {
        Self {
            extensions,
            sorted: true,
        }
    }

    /// Toggle name-sorted traversal.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// The extension allow-list in use.
    pub fn extensions(&self) -> &ImageExtensions {
        &self.extensions
    }

    /// Collect every image file under `root`, in traversal order.
    ///
    /// The first traversal error aborts the walk.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>, PrepError> {
        let mut images = Vec::new();
        self.walk(root, |path| {
            images.push(path);
            Ok(())
        })?;
        Ok(images)
    }

    /// Visit every image file under `root`, in traversal order.
    pub fn walk<F>(&self, root: &Path, mut visit: F) -> Result<(), PrepError>
    where
        F: FnMut(PathBuf) -> Result<(), PrepError>,
    {
        ensure_dir(root)?;

        for entry in walk_dir(root, self.sorted) {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if !is_file_like(&entry) {
                continue;
            }

            let path = entry.path();
            if self.extensions.matches(&path) {
                visit(path)?;
            } else {
                debug!(path = %path.display(), "skipping non-image file");
            }
        }

        Ok(())
    }
}

impl Default for ImageWalker {
    fn default() -> Self {
        Self::new(ImageExtensions::default())
    }
}

/// Build a serial jwalk iterator that includes hidden entries.
pub fn walk_dir(root: &Path, sorted: bool) -> WalkDir {
    WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .sort(sorted)
        .skip_hidden(false)
        .follow_links(false)
}

/// Convert a jwalk error into a path-carrying error.
pub fn walk_error(root: &Path, err: jwalk::Error) -> PrepError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    match err.io_error().map(|io| io.kind()) {
        Some(std::io::ErrorKind::PermissionDenied) => PrepError::PermissionDenied { path },
        Some(std::io::ErrorKind::NotFound) => PrepError::NotFound { path },
        _ => PrepError::Walk {
            path,
            message: err.to_string(),
        },
    }
}

/// Fail unless `path` is an existing directory.
pub fn ensure_dir(path: &Path) -> Result<(), PrepError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PrepError::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

/// Regular files, plus symlinks that do not resolve to a directory.
///
/// A dangling link stays in so that reading it fails with its path.
fn is_file_like(entry: &DirEntry<((), ())>) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

/// List the class directories of a training split, sorted by name.
///
/// Hidden directories and directories named in `ignored` are left out.
pub fn discover_classes(train_root: &Path, ignored: &[String]) -> Result<Vec<String>, PrepError> {
    ensure_dir(train_root)?;

    let entries = fs::read_dir(train_root).map_err(|e| PrepError::io(train_root, e))?;
    let mut classes = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| PrepError::io(train_root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || ignored.iter().any(|i| *i == name) {
            continue;
        }
        classes.push(name);
    }

    classes.sort();
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("b_sub")).unwrap();
        fs::write(root.join("c.jpg"), "c").unwrap();
        fs::write(root.join("a.PNG"), "a").unwrap();
        fs::write(root.join("notes.txt"), "n").unwrap();
        fs::write(root.join("b_sub/x.jpeg"), "x").unwrap();

        let images = ImageWalker::default().collect(root).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.PNG", "b_sub/x.jpeg", "c.jpg"]);
    }

    #[test]
    fn test_collect_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ImageWalker::default()
            .collect(&temp.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, PrepError::NotADirectory { .. }));
    }

    #[test]
    fn test_discover_classes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for dir in ["PNEUMONIA", "NORMAL", "__MACOSX", ".cache"] {
            fs::create_dir(root.join(dir)).unwrap();
        }
        fs::write(root.join("labels.csv"), "x").unwrap();

        let classes = discover_classes(root, &["__MACOSX".to_string()]).unwrap();
        assert_eq!(classes, vec!["NORMAL", "PNEUMONIA"]);
    }
}
