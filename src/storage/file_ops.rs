//! File housekeeping around datasets.
//!
//! Directory listings, file information, pattern search, timestamped
//! backups and their cleanup.

use crate::error::DataError;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Marker embedded in every backup filename.
const BACKUP_MARKER: &str = "_backup_";

/// Timestamp layout used in backup filenames.
const BACKUP_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Names of the entries directly inside a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Regular files, sorted.
    pub files: Vec<String>,
    /// Subdirectories, sorted.
    pub directories: Vec<String>,
}

/// Information about a single path.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
    pub is_file: bool,
    pub is_directory: bool,
    /// Extension including the leading dot, empty when there is none.
    pub extension: String,
}

impl FileInfo {
    /// Size in KiB.
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// List the files and subdirectories of `dir`.
///
/// A missing directory is logged and yields an empty listing.
pub fn list_directory(dir: &Path) -> Result<DirectoryListing, DataError> {
    if !dir.exists() {
        warn!("Directory does not exist: {}", dir.display());
        return Ok(DirectoryListing::default());
    }

    let mut listing = DirectoryListing::default();
    let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if path.is_file() {
            listing.files.push(name);
        } else if path.is_dir() {
            listing.directories.push(name);
        }
    }

    listing.files.sort();
    listing.directories.sort();
    Ok(listing)
}

/// Describe `path`, or `None` if it does not exist.
pub fn file_info(path: &Path) -> Result<Option<FileInfo>, DataError> {
    if !path.exists() {
        return Ok(None);
    }

    let metadata = fs::metadata(path).map_err(|e| DataError::io(path, e))?;
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    Ok(Some(FileInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        size_bytes: metadata.len(),
        modified: DateTime::<Local>::from(modified),
        is_file: metadata.is_file(),
        is_directory: metadata.is_dir(),
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
    }))
}

/// Find regular files under `dir` matching a glob pattern such as
/// `*.json` or `**/*.csv`.
pub fn find_files(pattern: &str, dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    // The directory is literal; only `pattern` carries glob syntax
    let full_pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern);

    let paths = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| DataError::Io {
        path: full_pattern.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
    })?;

    let mut matches: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    matches.sort();
    Ok(matches)
}

/// Backup filename for `path`: `<stem>_backup_<timestamp><ext>`.
fn backup_name(path: &Path, now: DateTime<Local>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    format!(
        "{}{}{}{}",
        stem,
        BACKUP_MARKER,
        now.format(BACKUP_TIMESTAMP),
        extension
    )
}

/// Copy `source` to `destination`.
///
/// When the destination already exists and `create_backup` is set, it is
/// first copied aside next to itself under a timestamped name.
pub fn copy_file(
    source: &Path,
    destination: &Path,
    create_backup: bool,
) -> Result<PathBuf, DataError> {
    if !source.exists() {
        return Err(DataError::NotFound {
            path: source.to_path_buf(),
        });
    }

    if destination.exists() && create_backup {
        let parent = destination.parent().unwrap_or_else(|| Path::new(""));
        let backup_path = parent.join(backup_name(destination, Local::now()));
        fs::copy(destination, &backup_path).map_err(|e| DataError::io(&backup_path, e))?;
        info!("Created backup: {}", backup_path.display());
    }

    fs::copy(source, destination).map_err(|e| DataError::io(destination, e))?;
    info!("Copied {} to {}", source.display(), destination.display());

    Ok(destination.to_path_buf())
}

/// Copy `path` into `backup_dir` under a timestamped name.
pub fn create_backup(path: &Path, backup_dir: &Path) -> Result<PathBuf, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if !backup_dir.exists() {
        fs::create_dir(backup_dir).map_err(|e| DataError::io(backup_dir, e))?;
    }

    let backup_path = backup_dir.join(backup_name(path, Local::now()));
    fs::copy(path, &backup_path).map_err(|e| DataError::io(&backup_path, e))?;
    info!("Backup created: {}", backup_path.display());

    Ok(backup_path)
}

/// Total size in bytes of all regular files below `dir`.
pub fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Delete all but the `keep` most recently modified backups in `backup_dir`.
///
/// Returns the deleted paths.
pub fn cleanup_old_backups(backup_dir: &Path, keep: usize) -> Result<Vec<PathBuf>, DataError> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(backup_dir).map_err(|e| DataError::io(backup_dir, e))?;

    let mut backups: Vec<(PathBuf, SystemTime)> = entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().contains(BACKUP_MARKER))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((entry.path(), modified))
        })
        .collect();

    // Newest first
    backups.sort_by(|a, b| b.1.cmp(&a.1));

    let mut deleted = Vec::new();
    for (path, _) in backups.into_iter().skip(keep) {
        fs::remove_file(&path).map_err(|e| DataError::io(&path, e))?;
        info!("Deleted old backup: {}", path.display());
        deleted.push(path);
    }

    Ok(deleted)
}

/// Create `dir` and any missing parents.
pub fn ensure_directory(dir: &Path) -> Result<PathBuf, DataError> {
    fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;
    Ok(dir.to_path_buf())
}
