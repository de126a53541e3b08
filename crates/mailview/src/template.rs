//! Template identifiers and the rendering mode they imply.
//!
//! A [`TemplateId::Name`] is a root such as `welcome` and renders both
//! bodies, from `welcome.html.mjml` and `welcome.text`. A
//! [`TemplateId::File`] names exactly one template and its suffix decides
//! which body it fills.

use std::fmt;

use crate::error::Error;

/// Suffix of markup templates that compile to the HTML body.
pub const HTML_SUFFIX: &str = ".html.mjml";

/// Suffix of plain-text templates.
pub const TEXT_SUFFIX: &str = ".text";

/// Which template(s) to render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Symbolic root; both bodies are rendered.
    Name(String),
    /// Explicit file name; one body is rendered.
    File(String),
}

impl TemplateId {
    pub fn name(name: impl Into<String>) -> Self {
        TemplateId::Name(name.into())
    }

    pub fn file(file: impl Into<String>) -> Self {
        TemplateId::File(file.into())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Name(name) => write!(f, ":{}", name),
            TemplateId::File(file) => write!(f, "{:?}", file),
        }
    }
}

/// The resolved rendering plan for a [`TemplateId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Only the HTML body, compiled from this markup template.
    Html(String),
    /// Only the text body, from this template.
    Text(String),
    /// Both bodies.
    Dual { html: String, text: String },
}

impl RenderMode {
    /// Works out which templates `id` refers to.
    ///
    /// Fails with [`Error::InvalidTemplateName`] for an explicit name with no
    /// recognized suffix, or for an empty symbolic name.
    pub fn resolve(id: &TemplateId) -> Result<Self, Error> {
        match id {
            TemplateId::Name(name) if name.is_empty() => {
                Err(Error::InvalidTemplateName(name.clone()))
            }
            TemplateId::Name(name) => Ok(RenderMode::Dual {
                html: format!("{}{}", name, HTML_SUFFIX),
                text: format!("{}{}", name, TEXT_SUFFIX),
            }),
            TemplateId::File(file) if file.ends_with(HTML_SUFFIX) => {
                Ok(RenderMode::Html(file.clone()))
            }
            TemplateId::File(file) if file.ends_with(TEXT_SUFFIX) => {
                Ok(RenderMode::Text(file.clone()))
            }
            TemplateId::File(file) => Err(Error::InvalidTemplateName(file.clone())),
        }
    }
}
