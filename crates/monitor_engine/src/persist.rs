use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use {path:?} as the results directory: {reason}")]
    ResultsDir { path: PathBuf, reason: String },
    #[error("writing result file failed: {0}")]
    Io(#[from] io::Error),
}

/// Makes sure downloaded results have a directory to land in.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let results_dir_error = |reason: String| PersistError::ResultsDir {
        path: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(results_dir_error("exists and is not a directory".into())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| results_dir_error(e.to_string()))
        }
        Err(err) => Err(results_dir_error(err.to_string())),
    }
}

/// Stores a job's result file in the results directory.
///
/// Bytes go to a temp file next to the target first and are renamed into
/// place, so an interrupted download never leaves a truncated CSV under the
/// job's name.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `bytes` as `{dir}/{filename}` and returns the final path.
    /// Downloading the same job again replaces the earlier file.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.as_file_mut().sync_all()?;

        if target.is_file() {
            fs::remove_file(&target)?;
        }
        staged.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
