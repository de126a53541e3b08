//! The email being rendered into.
//!
//! [`Email`] only carries what rendering needs: template bindings, rendering
//! settings, and the two bodies. Every builder method consumes the email and
//! returns the updated value, so a rendered email is always a new value and
//! the caller's copy is never touched.

use std::collections::HashMap;

use mailview_render::Layout;

use crate::template::{TemplateId, HTML_SUFFIX, TEXT_SUFFIX};

/// Template variable bindings.
pub type Assigns = HashMap<String, serde_json::Value>;

/// Rendering configuration stored on an email.
///
/// `None` means "not set yet"; [`Layout::NoLayout`] means "explicitly no
/// layout".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSettings {
    pub view_module: Option<String>,
    pub view_template: Option<TemplateId>,
    pub html_layout: Option<Layout>,
    pub text_layout: Option<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub assigns: Assigns,
    pub private: RenderSettings,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

impl Email {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `value` for templates.
    pub fn assign(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.assigns.insert(key.into(), value.into());
        self
    }

    /// Merge `extra` into the bindings; `extra` wins on conflicts.
    pub fn merge_assigns(mut self, extra: Assigns) -> Self {
        self.assigns.extend(extra);
        self
    }

    pub fn put_view(mut self, view: impl Into<String>) -> Self {
        self.private.view_module = Some(view.into());
        self
    }

    pub fn put_template(mut self, template: TemplateId) -> Self {
        self.private.view_template = Some(template);
        self
    }

    /// Set both layouts from one root.
    ///
    /// `put_layout("layouts", "email")` uses `layouts/email.html.mjml` around
    /// the HTML body and `layouts/email.text` around the text body.
    pub fn put_layout(self, view: impl Into<String>, root: impl AsRef<str>) -> Self {
        let view = view.into();
        let root = root.as_ref();
        self.put_html_layout(Layout::template(view.clone(), format!("{}{}", root, HTML_SUFFIX)))
            .put_text_layout(Layout::template(view, format!("{}{}", root, TEXT_SUFFIX)))
    }

    pub fn put_html_layout(mut self, layout: Layout) -> Self {
        self.private.html_layout = Some(layout);
        self
    }

    pub fn put_text_layout(mut self, layout: Layout) -> Self {
        self.private.text_layout = Some(layout);
        self
    }

    /// Render both bodies without any layout.
    pub fn without_layout(self) -> Self {
        self.put_html_layout(Layout::NoLayout)
            .put_text_layout(Layout::NoLayout)
    }

    /// Set any layout slot that is still unset to [`Layout::NoLayout`].
    pub fn with_default_layouts(mut self) -> Self {
        if self.private.html_layout.is_none() {
            self.private.html_layout = Some(Layout::NoLayout);
        }
        if self.private.text_layout.is_none() {
            self.private.text_layout = Some(Layout::NoLayout);
        }
        self
    }

    pub(crate) fn html_layout(&self) -> Layout {
        self.private.html_layout.clone().unwrap_or_default()
    }

    pub(crate) fn text_layout(&self) -> Layout {
        self.private.text_layout.clone().unwrap_or_default()
    }
}
