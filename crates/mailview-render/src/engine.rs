//! View engine abstraction.
//!
//! This module defines the [`ViewEngine`] trait, the single capability the
//! rest of mailview needs from a templating backend: render one template of
//! one view against a set of bindings, optionally wrapped in a layout. The
//! default implementation is [`MiniJinjaViewEngine`].
//!
//! Templates are addressed as `"<view>/<template>"`, so a view is simply a
//! directory (or name prefix) grouping related templates:
//!
//! ```text
//! templates/
//! ├── emails/
//! │   ├── welcome.html.mjml
//! │   └── welcome.text
//! └── layouts/
//!     ├── email.html.mjml
//!     └── email.text
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use minijinja::{AutoEscape, Environment, Value};
use tracing::debug;

use crate::error::RenderError;
use crate::layout::Layout;

/// Variable bindings handed to a template.
pub type Bindings = HashMap<String, serde_json::Value>;

/// Name under which a layout receives the rendered body.
pub const INNER_CONTENT: &str = "inner_content";

/// A template backend that renders a view's template into a string.
///
/// Implementations must report a missing template as
/// [`RenderError::TemplateNotFound`]; callers treat it as a deployment error
/// and never retry.
pub trait ViewEngine: Send + Sync {
    /// Renders `template` of `view` with `bindings`, wrapped in `layout`.
    fn render_to_string(
        &self,
        view: &str,
        template: &str,
        bindings: &Bindings,
        layout: &Layout,
    ) -> Result<String, RenderError>;
}

impl<T: ViewEngine + ?Sized> ViewEngine for Arc<T> {
    fn render_to_string(
        &self,
        view: &str,
        template: &str,
        bindings: &Bindings,
        layout: &Layout,
    ) -> Result<String, RenderError> {
        (**self).render_to_string(view, template, bindings, layout)
    }
}

/// Builds the engine-internal name of a view's template.
pub fn template_key(view: &str, template: &str) -> String {
    if view.is_empty() {
        template.to_string()
    } else {
        format!("{}/{}", view.trim_end_matches('/'), template)
    }
}

/// MiniJinja-based view engine.
///
/// Templates come from two places: inline sources registered with
/// [`add_template`](Self::add_template), and, for engines created with
/// [`from_dir`](Self::from_dir), files loaded lazily from the template root.
///
/// Markup templates (names ending in `.mjml`) are HTML-escaped; everything
/// else renders verbatim.
///
/// # Example
///
/// ```rust
/// use mailview_render::{Bindings, Layout, MiniJinjaViewEngine, ViewEngine};
///
/// let mut engine = MiniJinjaViewEngine::new();
/// engine.add_template("emails", "welcome.text", "Hi {{ user }}").unwrap();
/// engine
///     .add_template("layouts", "email.text", "{{ inner_content }}\n-- The Team")
///     .unwrap();
///
/// let mut bindings = Bindings::new();
/// bindings.insert("user".into(), "Alice".into());
///
/// let text = engine
///     .render_to_string(
///         "emails",
///         "welcome.text",
///         &bindings,
///         &Layout::template("layouts", "email.text"),
///     )
///     .unwrap();
/// assert_eq!(text, "Hi Alice\n-- The Team");
/// ```
pub struct MiniJinjaViewEngine {
    env: Environment<'static>,
}

impl MiniJinjaViewEngine {
    /// Creates an engine with no templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name: &str| {
            if name.ends_with(".mjml") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Creates an engine that loads `<root>/<view>/<template>` on demand.
    pub fn from_dir(root: impl AsRef<Path>) -> Self {
        let mut engine = Self::new();
        engine
            .env
            .set_loader(minijinja::path_loader(root.as_ref().to_path_buf()));
        engine
    }

    /// Registers an inline template for `view`.
    ///
    /// Inline templates shadow files with the same name.
    pub fn add_template(
        &mut self,
        view: &str,
        template: &str,
        source: impl Into<String>,
    ) -> Result<(), RenderError> {
        self.env
            .add_template_owned(template_key(view, template), source.into())?;
        Ok(())
    }

    /// Checks whether `template` of `view` can be resolved.
    pub fn has_template(&self, view: &str, template: &str) -> bool {
        self.env.get_template(&template_key(view, template)).is_ok()
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Use this to register custom filters or functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    fn render_one(
        &self,
        key: &str,
        context: &BTreeMap<String, Value>,
    ) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(key).map_err(|err| match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => {
                RenderError::TemplateNotFound(key.to_string())
            }
            _ => RenderError::from(err),
        })?;
        Ok(tmpl.render(context)?)
    }
}

impl Default for MiniJinjaViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEngine for MiniJinjaViewEngine {
    fn render_to_string(
        &self,
        view: &str,
        template: &str,
        bindings: &Bindings,
        layout: &Layout,
    ) -> Result<String, RenderError> {
        let key = template_key(view, template);
        let mut context: BTreeMap<String, Value> = bindings
            .iter()
            .map(|(name, value)| (name.clone(), Value::from_serialize(value)))
            .collect();

        let body = self.render_one(&key, &context)?;
        debug!(template = %key, bytes = body.len(), "Rendered view template");

        match layout {
            Layout::NoLayout => Ok(body),
            Layout::Template {
                view: layout_view,
                template: layout_template,
            } => {
                let layout_key = template_key(layout_view, layout_template);
                context.insert(INNER_CONTENT.to_string(), Value::from_safe_string(body));
                let wrapped = self.render_one(&layout_key, &context)?;
                debug!(layout = %layout_key, "Applied layout");
                Ok(wrapped)
            }
        }
    }
}

/// A single request observed by [`RecordingViewEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub view: String,
    pub template: String,
    pub bindings: Bindings,
    pub layout: Layout,
}

/// View engine double that returns canned bodies and records requests.
///
/// Unknown templates fail with [`RenderError::TemplateNotFound`], like a
/// real engine would.
#[derive(Debug, Default)]
pub struct RecordingViewEngine {
    bodies: HashMap<String, String>,
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingViewEngine {
    /// Creates an engine that knows no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `body` whenever `template` of `view` is rendered.
    pub fn with_template(
        mut self,
        view: &str,
        template: &str,
        body: impl Into<String>,
    ) -> Self {
        self.bodies.insert(template_key(view, template), body.into());
        self
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<RenderCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Names (without view) of every template requested so far, in order.
    pub fn rendered_templates(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.template).collect()
    }
}

impl ViewEngine for RecordingViewEngine {
    fn render_to_string(
        &self,
        view: &str,
        template: &str,
        bindings: &Bindings,
        layout: &Layout,
    ) -> Result<String, RenderError> {
        let call = RenderCall {
            view: view.to_string(),
            template: template.to_string(),
            bindings: bindings.clone(),
            layout: layout.clone(),
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }

        let key = template_key(view, template);
        self.bodies
            .get(&key)
            .cloned()
            .ok_or(RenderError::TemplateNotFound(key))
    }
}
