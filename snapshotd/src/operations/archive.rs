//! Snapshot archive creation
//!
//! Walks a node's data directory in a deterministic order and writes
//! every entry into a single gzip-compressed tar archive in the
//! staging directory.

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::errors::ArchiveError;
use crate::types::SnapshotInfo;

#[derive(Debug, Clone)]
pub struct Archiver {
    source_dir: PathBuf,
    staging_dir: PathBuf,
    name_prefix: String,
}

impl Archiver {
    pub fn new(source_dir: PathBuf, staging_dir: PathBuf, name_prefix: String) -> Self {
        Self {
            source_dir,
            staging_dir,
            name_prefix,
        }
    }

    /// Creates one `.tar.gz` archive of the source directory.
    ///
    /// Any unreadable entry or write failure aborts the whole operation
    /// with the offending path; a partial file may remain on disk and is
    /// the caller's to clean up. Two creations within the same second
    /// for the same prefix produce the same name.
    pub fn create(&self) -> Result<SnapshotInfo, ArchiveError> {
        if !self.source_dir.is_dir() {
            return Err(ArchiveError::SourceMissing {
                path: self.source_dir.display().to_string(),
            });
        }

        std::fs::create_dir_all(&self.staging_dir).map_err(|e| ArchiveError::WriteFailed {
            path: self.staging_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let created_at = Utc::now();
        let filename = format!(
            "{}-snapshot-{}.tar.gz",
            self.name_prefix,
            created_at.format("%Y-%m-%d-%H-%M-%S")
        );
        let archive_path = self.staging_dir.join(&filename);

        info!(
            "Creating snapshot of {} at {}",
            self.source_dir.display(),
            archive_path.display()
        );

        let file = File::create(&archive_path).map_err(|e| ArchiveError::WriteFailed {
            path: archive_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        // Symlinks are archived as links, never chased into.
        builder.follow_symlinks(false);

        self.append_tree(&mut builder)?;

        let encoder = builder
            .into_inner()
            .map_err(|e| ArchiveError::WriteFailed {
                path: archive_path.display().to_string(),
                reason: e.to_string(),
            })?;
        encoder.finish().map_err(|e| ArchiveError::WriteFailed {
            path: archive_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let size_bytes = std::fs::metadata(&archive_path)
            .map_err(|e| ArchiveError::WriteFailed {
                path: archive_path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        info!(
            "Snapshot created: {} ({} bytes)",
            archive_path.display(),
            size_bytes
        );

        Ok(SnapshotInfo {
            filename,
            path: archive_path,
            size_bytes,
            created_at,
        })
    }

    /// Appends every entry under the source directory to the archive,
    /// lexically ordered within each directory level so identical trees
    /// always produce identical member ordering.
    fn append_tree<W: std::io::Write>(
        &self,
        builder: &mut tar::Builder<W>,
    ) -> Result<(), ArchiveError> {
        let walker = WalkDir::new(&self.source_dir)
            .min_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| ArchiveError::EntryFailed {
                path: e
                    .path()
                    .unwrap_or(&self.source_dir)
                    .display()
                    .to_string(),
                reason: e.to_string(),
            })?;

            let relative = entry
                .path()
                .strip_prefix(&self.source_dir)
                .map_err(|e| ArchiveError::EntryFailed {
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                })?;

            builder
                .append_path_with_name(entry.path(), relative)
                .map_err(|e| ArchiveError::WriteFailed {
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }
}
