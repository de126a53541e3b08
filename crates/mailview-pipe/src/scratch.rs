//! Short-lived files used to hand markup to the compiler.
//!
//! A [`ScratchFile`] owns its path for its whole life: the name is random,
//! the file is created exclusively, and it is removed either by
//! [`ScratchFile::release`] or, on panic or early return, when the handle is
//! dropped.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of every scratch file name.
pub const SCRATCH_PREFIX: &str = "mailview-";

/// Extension of every scratch file name.
pub const SCRATCH_SUFFIX: &str = ".mjml";

#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("failed to create scratch file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write scratch file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove scratch file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A uniquely named file holding one compiler input.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Creates a scratch file in `dir` holding `content`.
    ///
    /// The content is fully written and flushed before this returns.
    pub fn create_in(dir: impl AsRef<Path>, content: &str) -> Result<Self, ScratchError> {
        let dir = dir.as_ref();
        let mut file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| ScratchError::Create {
                dir: dir.to_path_buf(),
                source,
            })?;

        let written = file
            .write_all(content.as_bytes())
            .and_then(|()| file.flush());
        if let Err(source) = written {
            return Err(ScratchError::Write {
                path: file.path().to_path_buf(),
                source,
            });
        }

        debug!(path = %file.path().display(), bytes = content.len(), "Created scratch file");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Removes the file.
    ///
    /// A file that is already gone is tolerated since nothing else ever
    /// owned its name; any other failure is reported.
    pub fn release(self) -> Result<(), ScratchError> {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => {
                debug!(path = %path.display(), "Removed scratch file");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Scratch file was already removed");
                Ok(())
            }
            Err(source) => Err(ScratchError::Remove { path, source }),
        }
    }
}
