//! Preparation configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::layout::ImageExtensions;

/// Configuration for a dataset preparation run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    /// Extensions recognized as images.
    #[builder(default)]
    pub image_extensions: ImageExtensions,

    /// Name of the training split directory under the dataset root.
    #[builder(default = "\"train\".to_string()")]
    pub train_dir: String,

    /// Name of the held-out evaluation directory, copied verbatim.
    #[builder(default = "\"test\".to_string()")]
    pub test_dir: String,

    /// Explicit class list (None = discover from the train directory).
    #[builder(default, setter(into, strip_option))]
    pub classes: Option<Vec<String>>,

    /// Scan classes on the rayon pool instead of one after another.
    #[builder(default = "false")]
    pub parallel_scan: bool,

    /// Example pairs shown per class by the reporter.
    #[builder(default = "3")]
    pub max_examples: usize,

    /// Minimum files for a directory to appear in the file-count report.
    #[builder(default = "10")]
    pub min_files_per_dir: usize,

    /// Files listed per directory by the structure printer.
    #[builder(default = "10")]
    pub tree_max_files: usize,

    /// Directory names skipped by discovery and statistics.
    #[builder(default = "vec![\"__MACOSX\".to_string()]")]
    pub ignored_dirs: Vec<String>,
}

impl PrepConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let train = self.train_dir.as_deref().unwrap_or("train");
        let test = self.test_dir.as_deref().unwrap_or("test");
        if train.is_empty() || test.is_empty() {
            return Err("Split directory names cannot be empty".to_string());
        }
        if train == test {
            return Err("Train and test directories must differ".to_string());
        }
        if let Some(ref exts) = self.image_extensions {
            if exts.as_slice().is_empty() {
                return Err("At least one image extension is required".to_string());
            }
        }
        Ok(())
    }
}

impl PrepConfig {
    /// Create a new config builder.
    pub fn builder() -> PrepConfigBuilder {
        PrepConfigBuilder::default()
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, PrepError> {
        let config: Self = toml::from_str(text).map_err(|e| PrepError::Config {
            message: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PrepError> {
        let text = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Re-run the builder's validation on an already built config.
    pub fn check(&self) -> Result<(), PrepError> {
        PrepConfigBuilder {
            image_extensions: Some(self.image_extensions.clone()),
            train_dir: Some(self.train_dir.clone()),
            test_dir: Some(self.test_dir.clone()),
            ..PrepConfigBuilder::default()
        }
        .validate()
        .map_err(|message| PrepError::Config { message })
    }

    /// Training split directory under a dataset root.
    pub fn train_root(&self, dataset_root: &Path) -> PathBuf {
        dataset_root.join(&self.train_dir)
    }

    /// Evaluation split directory under a dataset root.
    pub fn test_root(&self, dataset_root: &Path) -> PathBuf {
        dataset_root.join(&self.test_dir)
    }
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            image_extensions: ImageExtensions::default(),
            train_dir: "train".to_string(),
            test_dir: "test".to_string(),
            classes: None,
            parallel_scan: false,
            max_examples: 3,
            min_files_per_dir: 10,
            tree_max_files: 10,
            ignored_dirs: vec!["__MACOSX".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PrepConfig::builder()
            .classes(vec!["NORMAL".to_string(), "PNEUMONIA".to_string()])
            .parallel_scan(true)
            .max_examples(5usize)
            .build()
            .unwrap();

        assert_eq!(config.train_dir, "train");
        assert_eq!(config.test_dir, "test");
        assert_eq!(config.classes.as_ref().map(Vec::len), Some(2));
        assert!(config.parallel_scan);
        assert_eq!(config.max_examples, 5);
        assert_eq!(config.ignored_dirs, vec!["__MACOSX".to_string()]);
    }

    #[test]
    fn test_builder_rejects_same_split_dirs() {
        let result = PrepConfig::builder().train_dir("data").test_dir("data").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PrepConfig::from_toml_str(
            r#"
            test_dir = "val"
            image_extensions = ["png"]
            "#,
        )
        .unwrap();

        assert_eq!(config.test_dir, "val");
        assert_eq!(config.train_dir, "train");
        assert!(config.image_extensions.matches_name("x.PNG"));
        assert!(!config.image_extensions.matches_name("x.jpg"));
        assert_eq!(config.min_files_per_dir, 10);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = PrepConfig::from_toml_str("max_exmaples = 4").unwrap_err();
        assert!(matches!(err, PrepError::Config { .. }));
    }

    #[test]
    fn test_split_roots() {
        let config = PrepConfig::default();
        let root = Path::new("/data/chest_xray");
        assert_eq!(config.train_root(root), PathBuf::from("/data/chest_xray/train"));
        assert_eq!(config.test_root(root), PathBuf::from("/data/chest_xray/test"));
    }
}
