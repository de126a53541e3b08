use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CompilerConfig;
use crate::shell::{run_captured, ShellError};

/// Default compiler program.
pub const DEFAULT_PROGRAM: &str = "mjml";

/// Flags passed before the input path: write to stdout, skip validation.
pub const DEFAULT_FLAGS: &[&str] = &["-s", "--config.validationLevel=skip"];

/// Default wall-clock limit for one compiler run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PipeError {
    #[error("compiler `{program}` not found on PATH: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to run compiler `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("compiler `{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("compiler `{program}` {}{}", describe_exit(.exit_code), describe_stderr(.stderr))]
    CompilationFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("compiler `{program}` produced output that is not valid UTF-8")]
    InvalidUtf8 { program: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// The raw outcome of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process did not exit normally.
    pub exit_code: Option<i32>,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that turns a markup file into HTML.
pub trait CompilerInvoker: Send + Sync {
    /// Name used in logs and errors.
    fn program(&self) -> &str;

    /// Run the compiler against `path` and report what happened.
    ///
    /// Errors here mean the compiler could not be run at all; a compiler
    /// that ran and failed is an [`Invocation`] with a non-zero exit code.
    fn invoke(&self, path: &Path) -> Result<Invocation, PipeError>;

    /// Run the compiler and return its stdout as HTML.
    ///
    /// Any exit status other than zero is [`PipeError::CompilationFailed`];
    /// whatever the compiler printed to stdout is discarded in that case.
    fn compile(&self, path: &Path) -> Result<String, PipeError> {
        let invocation = self.invoke(path)?;
        if invocation.success() {
            return Ok(invocation.stdout);
        }
        warn!(
            program = self.program(),
            exit_code = ?invocation.exit_code,
            stderr = %invocation.stderr,
            "Markup compilation failed"
        );
        Err(PipeError::CompilationFailed {
            program: self.program().to_string(),
            exit_code: invocation.exit_code,
            stderr: invocation.stderr,
        })
    }
}

impl<T: CompilerInvoker + ?Sized> CompilerInvoker for Arc<T> {
    fn program(&self) -> &str {
        (**self).program()
    }

    fn invoke(&self, path: &Path) -> Result<Invocation, PipeError> {
        (**self).invoke(path)
    }
}

/// Runs an external compiler found on `PATH`.
///
/// The command line is `<program> <flags...> <path>`; no shell is involved.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    flags: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flags: DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// The `mjml` CLI with stdout output and validation disabled.
    pub fn mjml() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            program: config.program.clone(),
            flags: config.flags.clone(),
            timeout: config.timeout(),
        }
    }

    /// Replace the flags placed before the input path.
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the compiler however long it takes.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn resolve(&self) -> Result<PathBuf, PipeError> {
        which::which(&self.program).map_err(|source| PipeError::NotFound {
            program: self.program.clone(),
            source,
        })
    }
}

impl Default for CommandCompiler {
    fn default() -> Self {
        Self::mjml()
    }
}

impl CompilerInvoker for CommandCompiler {
    fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, path: &Path) -> Result<Invocation, PipeError> {
        let executable = self.resolve()?;
        let mut args: Vec<&OsStr> = self.flags.iter().map(OsStr::new).collect();
        args.push(path.as_os_str());

        debug!(
            program = %executable.display(),
            input = %path.display(),
            timeout = ?self.timeout,
            "Spawning markup compiler"
        );
        let captured = run_captured(&executable, &args, self.timeout).map_err(|err| match err {
            ShellError::Io(source) => PipeError::Io {
                program: self.program.clone(),
                source,
            },
            ShellError::Timeout(timeout) => PipeError::Timeout {
                program: self.program.clone(),
                timeout,
            },
        })?;

        let stderr = String::from_utf8_lossy(&captured.stderr).trim().to_string();
        let stdout = if captured.exit_code == Some(0) {
            String::from_utf8(captured.stdout).map_err(|_| PipeError::InvalidUtf8 {
                program: self.program.clone(),
            })?
        } else {
            String::from_utf8_lossy(&captured.stdout).into_owned()
        };
        debug!(exit_code = ?captured.exit_code, bytes = stdout.len(), "Markup compiler exited");

        Ok(Invocation {
            stdout,
            stderr,
            exit_code: captured.exit_code,
        })
    }
}

/// A compiler run observed by [`MockCompiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub path: PathBuf,
    /// File content at the moment the compiler ran, if it could be read.
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Exit { stdout: String, exit_code: i32 },
    Echo,
    SpawnFailure(String),
    TimedOut(Duration),
}

/// Compiler double for tests.
///
/// Records every input path along with the file content it saw, then
/// answers with a canned result.
#[derive(Debug)]
pub struct MockCompiler {
    outcome: MockOutcome,
    calls: Mutex<Vec<MockCall>>,
}

impl MockCompiler {
    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exits 0 printing `stdout`.
    pub fn succeeding(stdout: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Exit {
            stdout: stdout.into(),
            exit_code: 0,
        })
    }

    /// Exits with `exit_code`, still printing partial output.
    pub fn failing(exit_code: i32) -> Self {
        Self::with_outcome(MockOutcome::Exit {
            stdout: "<html><body>partial".to_string(),
            exit_code,
        })
    }

    /// Exits 0 printing the input file unchanged.
    pub fn echo() -> Self {
        Self::with_outcome(MockOutcome::Echo)
    }

    /// Cannot be started at all.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::SpawnFailure(message.into()))
    }

    /// Never finishes within `timeout`.
    pub fn timing_out(timeout: Duration) -> Self {
        Self::with_outcome(MockOutcome::TimedOut(timeout))
    }

    pub fn calls(&self) -> Vec<MockCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CompilerInvoker for MockCompiler {
    fn program(&self) -> &str {
        "mock-mjml"
    }

    fn invoke(&self, path: &Path) -> Result<Invocation, PipeError> {
        let content = fs::read_to_string(path).ok();
        let call = MockCall {
            path: path.to_path_buf(),
            content: content.clone(),
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }

        match &self.outcome {
            MockOutcome::Exit { stdout, exit_code } => Ok(Invocation {
                stdout: stdout.clone(),
                stderr: String::new(),
                exit_code: Some(*exit_code),
            }),
            MockOutcome::Echo => Ok(Invocation {
                stdout: content.unwrap_or_default(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
            MockOutcome::SpawnFailure(message) => Err(PipeError::Io {
                program: self.program().to_string(),
                source: std::io::Error::other(message.clone()),
            }),
            MockOutcome::TimedOut(timeout) => Err(PipeError::Timeout {
                program: self.program().to_string(),
                timeout: *timeout,
            }),
        }
    }
}
