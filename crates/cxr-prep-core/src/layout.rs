//! Dataset layout conventions: image extensions and train/test splits.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Case-insensitive allow-list of image file extensions.
///
/// Matching is done on the file name suffix, so `scan.JPG` and `.png` both
/// count. Content is never inspected: a text file renamed to `x.jpg` is
/// treated as an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ImageExtensions(Vec<String>);

impl ImageExtensions {
    /// Build an allow-list from extensions with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    /// Check whether a file name carries an allowed extension.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.0.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_str())
                && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
        })
    }

    /// Check whether a path's file name carries an allowed extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matches_name(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    /// The normalized extensions, lowercase and without dots.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::new(["jpeg", "jpg", "png"])
    }
}

impl From<Vec<String>> for ImageExtensions {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<ImageExtensions> for Vec<String> {
    fn from(extensions: ImageExtensions) -> Self {
        extensions.0
    }
}

/// Train or test designation of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// Classify a path: anything whose lowercase form contains `test` is the
    /// test split, everything else is train.
    pub fn of_path(path: &Path) -> Self {
        if path.to_string_lossy().to_lowercase().contains("test") {
            Self::Test
        } else {
            Self::Train
        }
    }

    /// Lowercase label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Check whether any component of `path` is one of the ignored names.
pub fn has_ignored_component(path: &Path, ignored: &[String]) -> bool {
    path.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        ignored.iter().any(|name| *name == part)
    })
}
