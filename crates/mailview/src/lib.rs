//! # mailview - Email bodies from view templates
//!
//! `mailview` renders the HTML and plain-text bodies of an email from view
//! templates. HTML bodies are written in [MJML](https://mjml.io) and piped
//! through an external compiler; text bodies are rendered directly.
//!
//! ## Choosing templates
//!
//! | Template | Renders | Bodies set |
//! |----------|---------|------------|
//! | `TemplateId::name("welcome")` | `welcome.html.mjml`, `welcome.text` | both |
//! | `TemplateId::file("welcome.html.mjml")` | `welcome.html.mjml` | `html_body` |
//! | `TemplateId::file("welcome.text")` | `welcome.text` | `text_body` |
//! | `TemplateId::file("welcome.html")` | nothing | [`Error::InvalidTemplateName`] |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mailview::{Assigns, CommandCompiler, Email, MiniJinjaViewEngine, Renderer, TemplateId};
//!
//! let renderer = Renderer::new(
//!     MiniJinjaViewEngine::from_dir("templates"),
//!     CommandCompiler::mjml(),
//! );
//!
//! let email = Email::new()
//!     .assign("user", "Alice")
//!     .put_layout("layouts", "email");
//!
//! let email = renderer.render("emails", &email, TemplateId::name("welcome"), Assigns::new())?;
//! println!("{}", email.html_body.unwrap_or_default());
//! # Ok::<(), mailview::Error>(())
//! ```
//!
//! ## Layouts
//!
//! [`Email::put_layout`] sets both layouts from one root (`email` becomes
//! `email.html.mjml` and `email.text`); [`Email::put_html_layout`] and
//! [`Email::put_text_layout`] set one slot each. Unset slots render without
//! a layout.
//!
//! ## Compilation
//!
//! The markup is written to a uniquely named scratch file, the compiler runs
//! as `mjml -s --config.validationLevel=skip <file>`, and its stdout becomes
//! the HTML body. A non-zero exit is [`Error::CompilationFailed`] and no
//! output is kept. The scratch file is removed whatever happens.
//!
//! ## Testing
//!
//! [`RecordingViewEngine`] and [`MockCompiler`] stand in for the engine and
//! the compiler process and record what they were asked to do.

mod email;
mod error;
pub mod pipeline;
mod renderer;
pub mod template;

pub use email::{Assigns, Email, RenderSettings};
pub use error::Error;
pub use renderer::Renderer;
pub use template::{RenderMode, TemplateId, HTML_SUFFIX, TEXT_SUFFIX};

pub use mailview_pipe::{
    CommandCompiler, CompilerConfig, CompilerInvoker, ConfigError, Invocation, MockCall,
    MockCompiler, PipeError, ScratchError, ScratchFile,
};
pub use mailview_render::{
    Bindings, Layout, MiniJinjaViewEngine, RecordingViewEngine, RenderCall, RenderError,
    ViewEngine,
};
