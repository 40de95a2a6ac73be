//! Writing rendered files. Existing files are always overwritten.
//!
//! Writes are not transactional: a failure part way through leaves the files
//! written so far in place.
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codegen::RenderedFile;
use crate::error::{Error, Result};

/// Create `dir` if needed and write every file into it, in order. Returns the
/// written paths.
pub fn write_all(dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;
    files.iter().map(|file| write_file(&dir.join(&file.name), &file.contents)).collect()
}

/// Write `contents` to `path`, creating the parent directory first.
pub fn write_file(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(path.to_path_buf())
}
