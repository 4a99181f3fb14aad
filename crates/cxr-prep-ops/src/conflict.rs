//! Handling of files that already exist at the destination.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when a copy target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Leave the existing file untouched.
    Skip,
}

impl ConflictPolicy {
    /// Check whether existing files get replaced.
    pub fn replaces_existing(&self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("Overwrite".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Overwrite));
        assert_eq!("skip".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Skip));
        assert!("merge".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn test_default_overwrites() {
        assert!(ConflictPolicy::default().replaces_existing());
        assert!(!ConflictPolicy::Skip.replaces_existing());
    }
}
