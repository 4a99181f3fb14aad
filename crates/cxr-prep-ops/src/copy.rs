//! Metadata-preserving file and tree copies.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use cxr_prep_core::PrepError;
use cxr_prep_scan::{ensure_dir, walk_dir, walk_error};

use crate::conflict::ConflictPolicy;

/// Counters for a tree copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    /// Files written.
    pub files: u64,
    /// Directories created or reused.
    pub dirs: u64,
    /// Bytes written.
    pub bytes: u64,
    /// Existing files left alone under [`ConflictPolicy::Skip`].
    pub kept_existing: u64,
}

/// Copy one file, carrying over permissions and access/modification times.
///
/// An existing destination file is truncated and overwritten, or replaced
/// when its permissions forbid writing (a previous copy of a read-only
/// source). Returns the number of bytes copied.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, PrepError> {
    let metadata = fs::metadata(source).map_err(|e| PrepError::io(source, e))?;
    let mut reader = File::open(source).map_err(|e| PrepError::io(source, e))?;
    let mut writer = create_replacing(dest).map_err(|e| PrepError::io(dest, e))?;

    let bytes = io::copy(&mut reader, &mut writer).map_err(|e| PrepError::io(source, e))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer.set_times(times).map_err(|e| PrepError::io(dest, e))?;
    writer
        .set_permissions(metadata.permissions())
        .map_err(|e| PrepError::io(dest, e))?;

    debug!(from = %source.display(), to = %dest.display(), bytes, "copied");
    Ok(bytes)
}

/// Open `dest` for writing, removing a read-only file standing in the way.
fn create_replacing(dest: &Path) -> io::Result<File> {
    match File::create(dest) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && dest.is_file() => {
            fs::remove_file(dest)?;
            File::create(dest)
        }
        other => other,
    }
}

impl CopyStats {
    fn merge(&mut self, other: &CopyStats) {
        self.files += other.files;
        self.dirs += other.dirs;
        self.bytes += other.bytes;
        self.kept_existing += other.kept_existing;
    }
}

/// Recursively copy `source` into `dest`, merging with existing content.
///
/// Every file is copied regardless of extension. Symlinks are followed:
/// a linked file is copied as a file and a linked directory as a directory.
/// Name clashes are resolved by `policy`.
pub fn copy_tree(source: &Path, dest: &Path, policy: ConflictPolicy) -> Result<CopyStats, PrepError> {
    ensure_dir(source)?;
    let real_source = fs::canonicalize(source).map_err(|e| PrepError::io(source, e))?;
    let mut ancestors = vec![real_source.clone()];
    copy_tree_inner(&real_source, dest, policy, &mut ancestors)
}

fn copy_tree_inner(
    source: &Path,
    dest: &Path,
    policy: ConflictPolicy,
    ancestors: &mut Vec<PathBuf>,
) -> Result<CopyStats, PrepError> {
    let mut stats = CopyStats::default();

    for entry in walk_dir(source, true) {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(Path::new(""));
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| PrepError::io(&target, e))?;
            stats.dirs += 1;
            continue;
        }

        if file_type.is_symlink() && path.is_dir() {
            let real = fs::canonicalize(&path).map_err(|e| PrepError::io(&path, e))?;
            if ancestors.iter().any(|a| a.starts_with(&real)) {
                return Err(PrepError::Walk {
                    path,
                    message: "symlink loops back into the tree being copied".to_string(),
                });
            }
            debug!(link = %path.display(), to = %real.display(), "following directory link");
            ancestors.push(real.clone());
            let linked = copy_tree_inner(&real, &target, policy, ancestors);
            ancestors.pop();
            stats.merge(&linked?);
            continue;
        }

        if target.exists() && !policy.replaces_existing() {
            stats.kept_existing += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
        }
        stats.bytes += copy_file(&path, &target)?;
        stats.files += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.jpg");
        let dst = temp.path().join("b.jpg");
        fs::write(&src, "pixels").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_times(FileTimes::new().set_modified(past))
            .unwrap();

        let bytes = copy_file(&src, &dst).unwrap();

        assert_eq!(bytes, 6);
        assert_eq!(fs::read(&dst).unwrap(), b"pixels");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.jpg");
        let dst = temp.path().join("b.jpg");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "much older content").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("missing.jpg");

        let err = copy_file(&src, &temp.path().join("out.jpg")).unwrap_err();
        assert_eq!(err.path(), Some(src.as_path()));
    }

    #[test]
    fn test_copy_tree_skip_policy_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("NORMAL")).unwrap();
        fs::create_dir_all(dst.join("NORMAL")).unwrap();
        fs::write(src.join("NORMAL/a.jpeg"), "source").unwrap();
        fs::write(src.join("NORMAL/b.jpeg"), "source").unwrap();
        fs::write(dst.join("NORMAL/a.jpeg"), "kept").unwrap();

        let stats = copy_tree(&src, &dst, ConflictPolicy::Skip).unwrap();

        assert_eq!(stats.files, 1);
        assert_eq!(stats.kept_existing, 1);
        assert_eq!(fs::read(dst.join("NORMAL/a.jpeg")).unwrap(), b"kept");
        assert_eq!(fs::read(dst.join("NORMAL/b.jpeg")).unwrap(), b"source");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_replaces_read_only_copy() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.jpg");
        let dst = temp.path().join("b.jpg");
        fs::write(&src, "v1").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        copy_file(&src, &dst).unwrap();
        assert!(fs::metadata(&dst).unwrap().permissions().readonly());

        fs::set_permissions(&src, fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(&src, "v2").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_rejects_link_cycle() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("NORMAL")).unwrap();
        std::os::unix::fs::symlink(&src, src.join("NORMAL/loop")).unwrap();

        let err = copy_tree(&src, &temp.path().join("dst"), ConflictPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, PrepError::Walk { .. }));
    }
}
