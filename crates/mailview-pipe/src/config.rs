//! Compiler configuration.
//!
//! Every field has a default, so an empty document (or no file at all) yields
//! the stock `mjml -s --config.validationLevel=skip` setup:
//!
//! ```yaml
//! program: /usr/local/bin/mjml
//! flags: ["-s", "--config.validationLevel=skip", "--config.minify=true"]
//! timeout_secs: 10
//! scratch_dir: /var/tmp/mailview
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::compiler::{DEFAULT_FLAGS, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid compiler config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Executable name or path; bare names are looked up on `PATH`.
    pub program: String,
    /// Arguments placed before the input file path.
    pub flags: Vec<String>,
    /// Seconds to wait before killing the compiler; `null` waits forever.
    pub timeout_secs: Option<u64>,
    /// Where scratch files are created; defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            flags: DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect(),
            timeout_secs: Some(DEFAULT_TIMEOUT.as_secs()),
            scratch_dir: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The configured scratch directory, or the system temp dir.
    pub fn resolved_scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
