//! Atomic file writer.
//!
//! Composed content is compared with the target first; byte-identical
//! targets are left alone (mtime included). Otherwise the content goes to a
//! sibling `<file>.stencil.tmp` which is then renamed over the target, so a
//! reader never observes a half-written file. Bytes are written verbatim:
//! a modified file has to keep everything outside its regions, line endings
//! included.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ExportError};

const TMP_SUFFIX: &str = ".stencil.tmp";

/// What happened to one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// New or changed content landed on disk.
    Written { path: PathBuf },
    /// On-disk content already matched; nothing was touched.
    Unchanged { path: PathBuf },
    /// Dry run: the target differs and would have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Write `content` to `path` unless it is already there.
pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, ExportError> {
    write_via(path, &tmp_path_for(path), content, dry_run)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

fn write_via(
    path: &Path,
    tmp: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, ExportError> {
    let target = path.to_path_buf();
    if read_bytes(path)?.as_deref() == Some(content.as_bytes()) {
        tracing::debug!("{} is up to date", path.display());
        return Ok(WriteResult::Unchanged { path: target });
    }
    if dry_run {
        tracing::info!("would write {}", path.display());
        return Ok(WriteResult::WouldWrite { path: target });
    }

    ensure_parent(path)?;
    ensure_parent(tmp)?;
    fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    fs::rename(tmp, path).map_err(|e| {
        let _ = fs::remove_file(tmp);
        io_err(path, e)
    })?;

    tracing::info!("wrote {}", path.display());
    Ok(WriteResult::Written { path: target })
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
        }
        _ => Ok(()),
    }
}

/// Raw bytes of `path`, or `None` if it does not exist. The target may hold
/// anything, text or not; an overwrite replaces it regardless.
pub(crate) fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, ExportError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Current text of `path`, or `None` if it does not exist. Used where the
/// content has to be parsed for regions.
pub(crate) fn read_existing(path: &Path) -> Result<Option<String>, ExportError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}
