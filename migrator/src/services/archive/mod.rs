//! Archive bridge between the export download and the import upload
//!
//! Exported packages arrive as zip bytes. They are unpacked into a directory
//! tree and repacked into a single canonical archive that the importer reads
//! back from disk.

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// File name of the canonical archive inside a working directory
pub const CANONICAL_ARCHIVE_NAME: &str = "package.zip";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid zip archive: {0}")]
    Zip(#[from] ZipError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive entry '{name}' escapes the extraction directory")]
    UnsafeEntry { name: String },

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Archive {path} is empty")]
    Empty { path: PathBuf },
}

impl ArchiveError {
    fn io(path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Extract the zip held in `bytes` into `target_dir`.
///
/// Returns the relative paths of the written files. Entries that would land
/// outside `target_dir` abort the extraction; files written before the
/// failure are left in place.
pub fn extract_archive(bytes: &[u8], target_dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut written = Vec::with_capacity(archive.len());

    fs::create_dir_all(target_dir).map_err(|e| ArchiveError::io(target_dir, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel_path) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(ArchiveError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        };

        let out_path = target_dir.join(&rel_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let mut outfile = fs::File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| ArchiveError::io(&out_path, e))?;

        debug!("Extracted {}", rel_path.display());
        written.push(rel_path);
    }

    info!("Extracted {} files into {}", written.len(), target_dir.display());
    Ok(written)
}

/// Compress the tree under `source_dir` into `archive_path`, replacing any existing file.
///
/// Entries are written in sorted order with `/` separators; `archive_path`
/// itself is skipped when it lives inside `source_dir`. Returns the archive size.
pub fn compress_directory(source_dir: &Path, archive_path: &Path) -> Result<u64, ArchiveError> {
    let file = fs::File::create(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != archive_path);

    for entry in walker {
        let entry = entry.map_err(|source| ArchiveError::Walk {
            root: source_dir.to_path_buf(),
            source,
        })?;

        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|_| ArchiveError::UnsafeEntry {
                name: entry.path().display().to_string(),
            })?;
        let name = rel.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
            continue;
        }

        let mut source = fs::File::open(entry.path()).map_err(|e| ArchiveError::io(entry.path(), e))?;
        writer.start_file(name, options)?;
        io::copy(&mut source, &mut writer).map_err(|e| ArchiveError::io(entry.path(), e))?;
    }

    let mut file = writer.finish()?;
    file.flush().map_err(|e| ArchiveError::io(archive_path, e))?;

    let size = fs::metadata(archive_path)
        .map_err(|e| ArchiveError::io(archive_path, e))?
        .len();
    info!("Packed {} into {} ({} bytes)", source_dir.display(), archive_path.display(), size);
    Ok(size)
}

/// Unpack `bytes` into `extract_dir` and repack it as `archive_path`.
///
/// Returns the number of files carried over and the canonical archive size.
pub fn repackage(
    bytes: &[u8],
    extract_dir: &Path,
    archive_path: &Path,
) -> Result<(usize, u64), ArchiveError> {
    let files = extract_archive(bytes, extract_dir)?;
    let size = compress_directory(extract_dir, archive_path)?;
    Ok((files.len(), size))
}

/// Size of the archive at `path`, failing when it is missing or empty
pub fn ensure_archive_ready(path: &Path) -> Result<u64, ArchiveError> {
    let size = fs::metadata(path).map_err(|e| ArchiveError::io(path, e))?.len();
    if size == 0 {
        return Err(ArchiveError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(size)
}

/// Read a canonical archive back into memory for upload
pub async fn read_archive(path: &Path) -> Result<Vec<u8>, ArchiveError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| ArchiveError::io(path, e))?;

    if data.is_empty() {
        return Err(ArchiveError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(data)
}

/// Build an in-memory zip from `(name, contents)` pairs
pub fn build_archive(entries: &[(&str, &[u8])]) -> Result<Vec<u8>, ArchiveError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in entries {
            writer.start_file(*name, options)?;
            writer
                .write_all(contents)
                .map_err(|e| ArchiveError::io(Path::new(name), e))?;
        }
        writer.finish()?;
    }
    Ok(cursor.into_inner())
}
