//! Archive download and extraction.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, info};

use cxr_prep_core::PrepError;

/// Counters for an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Files written.
    pub files: u64,
    /// Directories created.
    pub dirs: u64,
}

/// Whether a download actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The archive was fetched and written.
    Downloaded { bytes: u64 },
    /// The archive was already on disk.
    AlreadyPresent,
}

/// Direct-download URL for a Google Drive file id.
pub fn drive_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={file_id}")
}

/// Extract every entry of a zip archive below `dest_dir`.
///
/// Entries whose names would land outside `dest_dir` are rejected.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<ExtractStats, PrepError> {
    let archive_err = |message: String| PrepError::Archive {
        path: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path).map_err(|e| PrepError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    fs::create_dir_all(dest_dir).map_err(|e| PrepError::io(dest_dir, e))?;

    let mut stats = ExtractStats::default();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(archive_err(format!("unsafe entry name: {}", entry.name())));
        };
        let target = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| PrepError::io(&target, e))?;
            stats.dirs += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| PrepError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| PrepError::io(&target, e))?;
        debug!(path = %target.display(), "extracted");
        stats.files += 1;
    }

    info!(
        archive = %archive_path.display(),
        dest = %dest_dir.display(),
        files = stats.files,
        "archive extracted"
    );
    Ok(stats)
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// The body is streamed to a `.part` file that is renamed into place once
/// complete, so an interrupted download is retried on the next run.
#[cfg(feature = "download")]
pub fn download_archive(url: &str, dest: &Path) -> Result<DownloadOutcome, PrepError> {
    if dest.exists() {
        info!(path = %dest.display(), "archive already present, skipping download");
        return Ok(DownloadOutcome::AlreadyPresent);
    }

    let download_err = |message: String| PrepError::Download {
        url: url.to_string(),
        message,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
    }

    info!(url, path = %dest.display(), "downloading archive");
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| download_err(e.to_string()))?;

    let partial = dest.with_extension("part");
    let mut out = File::create(&partial).map_err(|e| PrepError::io(&partial, e))?;
    let bytes = io::copy(&mut response, &mut out).map_err(|e| download_err(e.to_string()))?;
    drop(out);
    fs::rename(&partial, dest).map_err(|e| PrepError::io(dest, e))?;

    Ok(DownloadOutcome::Downloaded { bytes })
}

/// Download (if needed) and extract an archive.
#[cfg(feature = "download")]
pub fn fetch_archive(url: &str, archive_path: &Path, dest_dir: &Path) -> Result<ExtractStats, PrepError> {
    download_archive(url, archive_path)?;
    extract_archive(archive_path, dest_dir)
}
