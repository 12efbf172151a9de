//! File system helpers: text and binary I/O, archives, digests, watching
//! Author: kartik4091
//! Created: 2025-06-04

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::dates;
use crate::error::{Error, Result};

const BUFFER_SIZE: usize = 8192;

// Text and binary I/O

#[instrument]
pub fn read_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Creates or truncates `path`.
#[instrument(skip(content))]
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    Ok(fs::write(path, content)?)
}

#[instrument]
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(String::from).collect())
}

#[instrument(skip(content))]
pub fn append_to_file(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[instrument]
pub fn read_binary_file(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

#[instrument(skip(data))]
pub fn write_binary_file(path: &Path, data: &[u8]) -> Result<()> {
    Ok(fs::write(path, data)?)
}

/// Calls `on_chunk` with successive pieces of at most `chunk_size` bytes.
#[instrument(skip(on_chunk))]
pub fn read_in_chunks<F>(path: &Path, chunk_size: usize, mut on_chunk: F) -> Result<u64>
where
    F: FnMut(&[u8]),
{
    if chunk_size == 0 {
        return Err(Error::validation("Chunk size must be greater than 0"));
    }
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        on_chunk(&buffer[..n]);
        total += n as u64;
    }
    Ok(total)
}

// Copy, move, delete

#[instrument]
pub fn copy_file(source: &Path, destination: &Path) -> Result<u64> {
    Ok(fs::copy(source, destination)?)
}

/// Renames, falling back to copy and delete across file systems.
#[instrument]
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("Rename failed ({}), copying instead", rename_err);
            fs::copy(source, destination).map_err(|_| rename_err)?;
            fs::remove_file(source)?;
            Ok(())
        }
    }
}

/// `Ok(true)` when removed, `Ok(false)` when nothing was there.
#[instrument]
pub fn delete_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Removes a directory tree. `Ok(false)` when it did not exist.
#[instrument]
pub fn delete_directory(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Creates `path` and any missing parents.
#[instrument]
pub fn create_directory(path: &Path) -> Result<()> {
    Ok(fs::create_dir_all(path)?)
}

/// Copies `source` into `target`. A target inside the source tree is rejected.
#[instrument]
pub fn copy_directory(source: &Path, target: &Path) -> Result<u64> {
    let source_root = fs::canonicalize(source)?;
    if resolve_path(target)?.starts_with(&source_root) {
        return Err(Error::validation(format!(
            "Cannot copy {} into itself ({})",
            source.display(),
            target.display()
        )));
    }
    let mut copied = 0u64;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::validation(e.to_string()))?;
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Canonical form of `path`, which need not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail re-appended.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = fs::canonicalize(existing)?;
    resolved.extend(tail.iter().rev());
    Ok(resolved)
}

// Metadata

pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

pub fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

pub fn last_modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Last modification time in the system zone, rendered with a strftime pattern.
pub fn last_modified_formatted(path: &Path, pattern: &str) -> Result<String> {
    let modified: DateTime<Local> = last_modified(path)?.into();
    dates::format_zoned(&modified, pattern)
}

pub fn file_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}

pub fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

pub fn file_name_without_extension(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

pub fn canonical_path(path: &Path) -> Result<PathBuf> {
    Ok(fs::canonicalize(path)?)
}

/// Guesses a MIME type from the file extension.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

// Listing

fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() == want_dirs {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

/// Regular files directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_entries(dir, false)
}

pub fn list_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    list_entries(dir, true)
}

pub fn list_files_recursively(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

// Archives

fn zip_options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn add_file_to_zip<W: Write + io::Seek>(zip: &mut ZipWriter<W>, source: &Path, name: &str) -> Result<()> {
    zip.start_file(name, zip_options())?;
    let mut reader = BufReader::new(File::open(source)?);
    io::copy(&mut reader, zip)?;
    Ok(())
}

/// Zips a single file under its own name.
#[instrument]
pub fn compress_file(source: &Path, zip_path: &Path) -> Result<()> {
    let name = file_name(source)
        .ok_or_else(|| Error::validation(format!("No file name in {}", source.display())))?;
    let mut zip = ZipWriter::new(File::create(zip_path)?);
    add_file_to_zip(&mut zip, source, &name)?;
    zip.finish()?;
    Ok(())
}

/// Zips several files flat; sources that do not exist are skipped.
#[instrument(skip(sources))]
pub fn compress_files(sources: &[PathBuf], zip_path: &Path) -> Result<usize> {
    let mut zip = ZipWriter::new(File::create(zip_path)?);
    let mut added = 0;
    for source in sources {
        if !source.is_file() {
            warn!("Skipping missing file: {}", source.display());
            continue;
        }
        let Some(name) = file_name(source) else {
            continue;
        };
        add_file_to_zip(&mut zip, source, &name)?;
        added += 1;
    }
    zip.finish()?;
    Ok(added)
}

/// Zips a directory tree with entry names relative to `source_dir`. An archive
/// written inside `source_dir` is left out of itself.
#[instrument]
pub fn compress_directory(source_dir: &Path, zip_path: &Path) -> Result<usize> {
    let mut zip = ZipWriter::new(File::create(zip_path)?);
    let archive = fs::canonicalize(zip_path)?;
    let entries = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(io::Error::from)?;

    let mut added = 0;
    for entry in entries {
        if entry.file_type().is_file() && fs::canonicalize(entry.path())? == archive {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| Error::validation(e.to_string()))?;
        let name = entry_name(relative);
        if name.is_empty() {
            continue;
        }
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), zip_options())?;
        } else {
            add_file_to_zip(&mut zip, entry.path(), &name)?;
            added += 1;
        }
    }
    zip.finish()?;
    Ok(added)
}

/// Extracts into `dest_dir`. An entry whose path would leave `dest_dir` aborts extraction.
#[instrument]
pub fn extract_zip_file(zip_path: &Path, dest_dir: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(zip_path)?))?;
    fs::create_dir_all(dest_dir)?;
    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            Error::validation(format!("Zip entry escapes destination: {}", entry.name()))
        })?;
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&out_path)?);
        io::copy(&mut entry, &mut out)?;
        out.flush()?;
        extracted += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode().filter(|m| m & 0o700 != 0) {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))?;
            }
        }
    }
    Ok(extracted)
}

#[instrument]
pub fn gzip_file(source: &Path, target: &Path) -> Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(target)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

#[instrument]
pub fn gunzip_file(source: &Path, target: &Path) -> Result<()> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(source)?));
    let mut writer = BufWriter::new(File::create(target)?);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;
    Ok(())
}

// Temporary files

/// Creates a temp file that outlives the returned path.
pub fn create_temp_file(prefix: &str, suffix: &str) -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Creates a temp directory that outlives the returned path.
pub fn create_temp_directory(prefix: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
    Ok(dir.keep())
}

// Digests

fn digest_file<F: FnMut(&[u8])>(path: &Path, mut update: F) -> Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buffer = [0u8; BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        update(&buffer[..n]);
    }
    Ok(())
}

/// Lower-case hex MD5 of the file contents.
#[instrument]
pub fn md5_hex(path: &Path) -> Result<String> {
    let mut context = md5::Context::new();
    digest_file(path, |chunk| context.consume(chunk))?;
    Ok(format!("{:x}", context.compute()))
}

/// Lower-case hex SHA-256 of the file contents.
#[instrument]
pub fn sha256_hex(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    digest_file(path, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Byte-for-byte equality.
#[instrument]
pub fn compare_files(first: &Path, second: &Path) -> Result<bool> {
    if fs::metadata(first)?.len() != fs::metadata(second)?.len() {
        return Ok(false);
    }
    let mut a = BufReader::new(File::open(first)?);
    let mut b = BufReader::new(File::open(second)?);
    let mut buf_a = [0u8; BUFFER_SIZE];
    let mut buf_b = [0u8; BUFFER_SIZE];
    loop {
        let n = fill(&mut a, &mut buf_a)?;
        let m = fill(&mut b, &mut buf_b)?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

// Permissions

/// Parses a nine-character `rwxr-xr--` string into a mode.
pub fn parse_permissions(perms: &str) -> Result<u32> {
    let chars: Vec<char> = perms.chars().collect();
    if chars.len() != 9 {
        return Err(Error::validation(format!("Invalid permission string: {}", perms)));
    }
    let mut mode = 0u32;
    for (i, c) in chars.iter().enumerate() {
        let expected = ['r', 'w', 'x'][i % 3];
        mode <<= 1;
        if *c == expected {
            mode |= 1;
        } else if *c != '-' {
            return Err(Error::validation(format!("Invalid permission string: {}", perms)));
        }
    }
    Ok(mode)
}

pub fn format_permissions(mode: u32) -> String {
    (0..9)
        .map(|i| {
            let bit = 1 << (8 - i);
            if mode & bit != 0 {
                ['r', 'w', 'x'][i % 3]
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(unix)]
pub fn set_file_permissions(path: &Path, perms: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = parse_permissions(perms)?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(unix)]
pub fn get_file_permissions(path: &Path) -> Result<String> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    Ok(format_permissions(mode & 0o777))
}

#[cfg(not(unix))]
pub fn set_file_permissions(_path: &Path, _perms: &str) -> Result<()> {
    Err(Error::validation("POSIX permissions are not supported on this platform"))
}

#[cfg(not(unix))]
pub fn get_file_permissions(_path: &Path) -> Result<String> {
    Err(Error::validation("POSIX permissions are not supported on this platform"))
}

// Watching

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// Watching stops when this is dropped.
pub struct DirectoryWatch {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl DirectoryWatch {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reports changes directly inside `dir` to `on_change` from a background thread.
#[instrument(skip(on_change))]
pub fn watch_directory<F>(dir: &Path, on_change: F) -> Result<DirectoryWatch>
where
    F: Fn(FileChange) + Send + 'static,
{
    if !dir.is_dir() {
        return Err(Error::validation(format!("Not a directory: {}", dir.display())));
    }

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                let kind = match event.kind {
                    EventKind::Create(_) => ChangeKind::Created,
                    EventKind::Modify(_) => ChangeKind::Modified,
                    EventKind::Remove(_) => ChangeKind::Removed,
                    _ => ChangeKind::Other,
                };
                for path in event.paths {
                    on_change(FileChange { kind, path });
                }
            }
            Err(e) => warn!("Directory watch error: {}", e),
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    Ok(DirectoryWatch {
        _watcher: watcher,
        path: dir.to_path_buf(),
    })
}
