//! Layout references.

/// A wrapping template applied around a rendered body.
///
/// Each output format tracks its own layout slot, so an email usually holds
/// two of these: one for the HTML (markup) body and one for the text body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Render the body as-is.
    #[default]
    NoLayout,

    /// Wrap the body in `template` from `view`.
    ///
    /// The layout sees the same bindings as the body plus `inner_content`.
    Template { view: String, template: String },
}

impl Layout {
    /// Creates a layout reference to `template` inside `view`.
    pub fn template(view: impl Into<String>, template: impl Into<String>) -> Self {
        Layout::Template {
            view: view.into(),
            template: template.into(),
        }
    }

    /// Returns `true` unless this is [`Layout::NoLayout`].
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Layout::NoLayout)
    }
}
