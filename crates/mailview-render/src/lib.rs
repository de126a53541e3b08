//! # mailview-render - View engine for email bodies
//!
//! `mailview-render` turns a `(view, template, bindings)` request into a
//! string. It is the templating foundation of `mailview`, which uses it to
//! produce both the intermediate MJML markup for HTML bodies and the final
//! plain-text bodies.
//!
//! ## Core Concepts
//!
//! - [`ViewEngine`]: the rendering capability the rest of mailview depends on
//! - [`MiniJinjaViewEngine`]: Jinja-compatible engine, inline or file-backed
//! - [`Layout`]: an optional wrapping template, one per output format
//! - [`RenderError`]: what can go wrong, with missing templates kept distinct
//!
//! ## Layouts
//!
//! A layout is rendered after the body with the same bindings plus
//! `inner_content`, which holds the rendered body:
//!
//! ```jinja
//! <mjml>
//!   <mj-body>{{ inner_content }}</mj-body>
//! </mjml>
//! ```
//!
//! ## Testing
//!
//! [`RecordingViewEngine`] returns canned bodies and records every request,
//! so dispatch logic can be tested without template files.

pub mod engine;
mod error;
mod layout;

pub use engine::{
    template_key, Bindings, MiniJinjaViewEngine, RecordingViewEngine, RenderCall, ViewEngine,
    INNER_CONTENT,
};
pub use error::RenderError;
pub use layout::Layout;
