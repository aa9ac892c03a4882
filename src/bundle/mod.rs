//! Output bundle
//!
//! ```text
//! <output_dir>/
//!   <name>.html
//!   data/<preserved-subpath>/<file>
//!   PLEASE_MAKE_SURE_IM_UNZIPPED.txt
//! ```
//!
//! The directory is prepared (and probed for writability) before any media is
//! copied, so an unwritable destination fails the build early.

pub mod paths;

pub use paths::{preserved_subpath, resolve_column, CopyEvent, PathResolver, ResolvedColumn};

use crate::error::{BuildError, Result, Warning, Warnings};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subdirectory holding copied media
pub const DATA_DIR: &str = "data";

/// Reminder written next to the document
pub const UNZIP_MARKER: &str = "PLEASE_MAKE_SURE_IM_UNZIPPED.txt";

const UNZIP_TEXT: &str =
    "Please make sure to unzip the whole folder before opening the html file, otherwise the media files cannot be found.\n";

const WRITE_PROBE: &str = ".mediascatter-write-probe";

/// Create the output directory, optionally clearing it first, and check that
/// it is writable.
///
/// Clearing is refused (with a warning) when the directory is the working
/// directory or one of its ancestors.
pub fn prepare_output_dir(dir: &Path, clear: bool, warnings: &mut Warnings) -> Result<()> {
    if clear && dir.exists() {
        if contains_working_dir(dir) {
            warnings.push(Warning::RefusedToClear(dir.to_path_buf()));
        } else {
            tracing::info!(dir = %dir.display(), "clearing output directory");
            fs::remove_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        }
    }

    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;

    let probe = dir.join(WRITE_PROBE);
    fs::write(&probe, b"").map_err(|e| BuildError::io(&probe, e))?;
    fs::remove_file(&probe).map_err(|e| BuildError::io(&probe, e))?;

    tracing::debug!(dir = %dir.display(), "output directory ready");
    Ok(())
}

fn contains_working_dir(dir: &Path) -> bool {
    let (Ok(dir), Ok(cwd)) = (dir.canonicalize(), std::env::current_dir()) else {
        return false;
    };
    let cwd = cwd.canonicalize().unwrap_or(cwd);
    cwd.starts_with(dir)
}

/// Write the unzip reminder, returns its path
pub fn write_marker(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(UNZIP_MARKER);
    fs::write(&path, UNZIP_TEXT).map_err(|e| BuildError::io(&path, e))?;
    Ok(path)
}

/// File count and total size of a bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Walk the bundle and total up regular files. Unreadable entries are skipped.
pub fn summarize(dir: &Path) -> BundleSummary {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .fold(BundleSummary::default(), |acc, meta| BundleSummary {
            files: acc.files + 1,
            bytes: acc.bytes + meta.len(),
        })
}

/// Result of writing a bundle
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// The written document
    pub html: PathBuf,
    pub output_dir: PathBuf,
    /// Files copied into `data/`
    pub copied: usize,
    /// Bundle-relative targets claimed during path resolution
    pub used_paths: BTreeSet<PathBuf>,
    pub warnings: Vec<Warning>,
}

impl BundleReport {
    pub fn summary(&self) -> BundleSummary {
        summarize(&self.output_dir)
    }
}
