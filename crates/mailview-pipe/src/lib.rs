//! Scratch files and external compiler invocation.
//!
//! The HTML side of mailview renders MJML first and needs an external program
//! to turn it into HTML. This crate owns that hand-off:
//!
//! - [`ScratchFile`]: a uniquely named file holding the markup, removed on
//!   every exit path
//! - [`CompilerInvoker`]: the seam between mailview and the compiler, with
//!   [`CommandCompiler`] running a real process and [`MockCompiler`] for tests
//! - [`CompilerConfig`]: YAML-loadable program, flags, timeout and scratch dir

pub mod compiler;
pub mod config;
pub mod scratch;
pub mod shell;

pub use compiler::{
    CommandCompiler, CompilerInvoker, Invocation, MockCall, MockCompiler, PipeError,
    DEFAULT_FLAGS, DEFAULT_PROGRAM, DEFAULT_TIMEOUT,
};
pub use config::{CompilerConfig, ConfigError};
pub use scratch::{ScratchError, ScratchFile, SCRATCH_PREFIX, SCRATCH_SUFFIX};
