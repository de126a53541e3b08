//! Error types for view rendering.
//!
//! [`RenderError`] is the only error the view engine surfaces. It hides the
//! underlying MiniJinja error so callers can match on the failure class.

use std::fmt;

/// Error type for view engine operations.
#[derive(Debug)]
pub enum RenderError {
    /// The engine has no template registered or loadable under this name.
    TemplateNotFound(String),

    /// Template syntax error, undefined filter, or similar template fault.
    TemplateError(String),

    /// Bindings could not be turned into template values.
    SerializationError(String),

    /// Other operational error.
    OperationError(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateNotFound(name) => write!(f, "template not found: {}", name),
            RenderError::TemplateError(msg) => write!(f, "template error: {}", msg),
            RenderError::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            RenderError::OperationError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UndefinedError
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::TemplateError(err.to_string()),
            ErrorKind::BadSerialization => RenderError::SerializationError(err.to_string()),
            _ => RenderError::OperationError(err.to_string()),
        }
    }
}
