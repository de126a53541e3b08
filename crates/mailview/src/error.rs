//! Error types for email rendering.

use std::time::Duration;

use mailview_pipe::{PipeError, ScratchError};
use mailview_render::RenderError;
use thiserror::Error;

/// Everything that can stop an email from being rendered.
///
/// A failed render never leaves a body half-set: the caller either gets an
/// email with every body the template called for, or one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// An explicit template file name has neither recognized suffix.
    #[error("invalid template name `{0}`: expected a name ending in `.html.mjml` or `.text`")]
    InvalidTemplateName(String),

    /// The view engine could not resolve a template or layout.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Nothing told the renderer which template to use.
    #[error("no template set on the email")]
    MissingTemplate,

    /// Nothing told the renderer which view holds the template.
    #[error("no view set on the email")]
    MissingView,

    /// The view engine failed for any other reason.
    #[error("render error: {0}")]
    Render(#[source] RenderError),

    /// The markup compiler ran and exited unsuccessfully.
    #[error("{0}")]
    CompilationFailed(#[source] PipeError),

    /// The markup compiler ran past its time limit and was killed.
    #[error("markup compiler `{program}` timed out after {timeout:?}")]
    CompilerTimeout { program: String, timeout: Duration },

    /// The markup compiler could not be started or produced unusable output.
    #[error("markup compiler unavailable: {0}")]
    CompilerUnavailable(#[source] PipeError),

    /// A scratch file could not be created, written or removed.
    #[error(transparent)]
    ScratchFile(#[from] ScratchError),
}

impl Error {
    /// Exit code of a failed compiler run, if that is what this is.
    pub fn compiler_exit_code(&self) -> Option<i32> {
        match self {
            Error::CompilationFailed(PipeError::CompilationFailed { exit_code, .. }) => *exit_code,
            _ => None,
        }
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::TemplateNotFound(name) => Error::TemplateNotFound(name),
            other => Error::Render(other),
        }
    }
}

impl From<PipeError> for Error {
    fn from(err: PipeError) -> Self {
        match err {
            PipeError::CompilationFailed { .. } => Error::CompilationFailed(err),
            PipeError::Timeout { program, timeout } => Error::CompilerTimeout { program, timeout },
            other => Error::CompilerUnavailable(other),
        }
    }
}
