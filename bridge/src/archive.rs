//! Archival seam for previously captured log folders
//!
//! `capture_logs` never overwrites an existing capture in place; when a
//! folder for the test name already exists it is handed to a
//! [`LogArchiver`] first. The archival mechanism itself is a collaborator
//! concern; [`TarGzArchiver`] is the default implementation.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

/// Compresses an existing capture folder out of the way.
#[mockall::automock]
pub trait LogArchiver: Send + Sync {
    /// Archive `dir` and remove it, returning the archive path.
    fn archive(&self, dir: &Path) -> io::Result<PathBuf>;
}

/// Default archiver producing `<dir>-<UTC timestamp>.tar.gz` next to the
/// folder it replaces.
pub struct TarGzArchiver;

impl LogArchiver for TarGzArchiver {
    fn archive(&self, dir: &Path) -> io::Result<PathBuf> {
        let name = dir
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "directory has no name"))?
            .to_string_lossy()
            .into_owned();
        let parent = dir.parent().unwrap_or_else(|| Path::new("."));
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let archive_path = parent.join(format!("{name}-{stamp}.tar.gz"));

        debug!("Archiving {} -> {}", dir.display(), archive_path.display());

        let file = File::create(&archive_path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.append_dir_all(&name, dir)?;
        builder.into_inner()?.finish()?;

        std::fs::remove_dir_all(dir)?;
        Ok(archive_path)
    }
}
