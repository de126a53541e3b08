//! Render orchestration and template dispatch.

use std::path::{Path, PathBuf};

use mailview_pipe::{CommandCompiler, CompilerConfig, CompilerInvoker};
use mailview_render::ViewEngine;
use tracing::debug;

use crate::email::{Assigns, Email};
use crate::error::Error;
use crate::pipeline::compile_markup;
use crate::template::{RenderMode, TemplateId};

/// Renders emails with an injected view engine and markup compiler.
///
/// A `Renderer` holds no per-render state, so one instance can be shared
/// across threads and used for any number of concurrent renders.
///
/// # Example
///
/// ```rust
/// use mailview::{Assigns, Email, MiniJinjaViewEngine, MockCompiler, Renderer, TemplateId};
///
/// let mut engine = MiniJinjaViewEngine::new();
/// engine.add_template("emails", "welcome.text", "Hi {{ user }}").unwrap();
///
/// let renderer = Renderer::new(engine, MockCompiler::echo());
/// let email = Email::new().assign("user", "Alice");
///
/// let rendered = renderer
///     .render("emails", &email, TemplateId::file("welcome.text"), Assigns::new())
///     .unwrap();
/// assert_eq!(rendered.text_body.as_deref(), Some("Hi Alice"));
/// assert_eq!(rendered.html_body, None);
/// ```
pub struct Renderer<E, C> {
    engine: E,
    compiler: C,
    scratch_dir: PathBuf,
}

impl<E: ViewEngine> Renderer<E, CommandCompiler> {
    /// Uses the real compiler process described by `config`.
    pub fn from_config(engine: E, config: &CompilerConfig) -> Self {
        Renderer::new(engine, CommandCompiler::from_config(config))
            .scratch_dir(config.resolved_scratch_dir())
    }
}

impl<E: ViewEngine, C: CompilerInvoker> Renderer<E, C> {
    /// Scratch files go to the system temp directory until
    /// [`scratch_dir`](Self::scratch_dir) says otherwise.
    pub fn new(engine: E, compiler: C) -> Self {
        Self {
            engine,
            compiler,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_dir
    }

    /// Render `template` of `view` into a copy of `email`.
    ///
    /// Unset layouts default to none, `assigns` override the email's own
    /// bindings, and the view and template are recorded on the result before
    /// dispatching.
    pub fn render(
        &self,
        view: &str,
        email: &Email,
        template: TemplateId,
        assigns: Assigns,
    ) -> Result<Email, Error> {
        let prepared = email
            .clone()
            .with_default_layouts()
            .merge_assigns(assigns)
            .put_view(view)
            .put_template(template);
        self.render_template(&prepared)
    }

    /// Render the view and template already recorded on `email`.
    ///
    /// Sets exactly the bodies the template calls for and leaves the other
    /// one as it was. Nothing is set unless every required render succeeds.
    pub fn render_template(&self, email: &Email) -> Result<Email, Error> {
        let template = email
            .private
            .view_template
            .as_ref()
            .ok_or(Error::MissingTemplate)?;
        let mode = RenderMode::resolve(template)?;
        debug!(%template, ?mode, "Dispatching email render");

        let mut rendered = email.clone();
        match mode {
            RenderMode::Html(html) => {
                rendered.html_body = Some(self.compile_html(email, &html)?);
            }
            RenderMode::Text(text) => {
                rendered.text_body = Some(self.render_text(email, &text)?);
            }
            RenderMode::Dual { html, text } => {
                let html_body = self.compile_html(email, &html)?;
                let text_body = self.render_text(email, &text)?;
                rendered.html_body = Some(html_body);
                rendered.text_body = Some(text_body);
            }
        }
        Ok(rendered)
    }

    /// Render a markup template inside the HTML layout and compile it.
    pub fn compile_html(&self, email: &Email, template: &str) -> Result<String, Error> {
        let view = view_of(email)?;
        let markup = self.engine.render_to_string(
            view,
            template,
            &email.assigns,
            &email.html_layout(),
        )?;
        compile_markup(&self.compiler, &self.scratch_dir, &markup)
    }

    /// Render a text template inside the text layout.
    pub fn render_text(&self, email: &Email, template: &str) -> Result<String, Error> {
        let view = view_of(email)?;
        Ok(self
            .engine
            .render_to_string(view, template, &email.assigns, &email.text_layout())?)
    }
}

fn view_of(email: &Email) -> Result<&str, Error> {
    email
        .private
        .view_module
        .as_deref()
        .ok_or(Error::MissingView)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailview_pipe::MockCompiler;
    use mailview_render::{Layout, RecordingViewEngine};

    type TestRenderer = Renderer<RecordingViewEngine, MockCompiler>;

    fn renderer(
        engine: RecordingViewEngine,
        compiler: MockCompiler,
    ) -> (TestRenderer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(engine, compiler).scratch_dir(dir.path());
        (renderer, dir)
    }

    #[test]
    fn render_template_requires_template() {
        let (renderer, _dir) = renderer(RecordingViewEngine::new(), MockCompiler::echo());
        let email = Email::new().put_view("emails");
        assert!(matches!(renderer.render_template(&email), Err(Error::MissingTemplate)));
    }

    #[test]
    fn render_template_requires_view() {
        let (renderer, _dir) = renderer(
            RecordingViewEngine::new().with_template("emails", "a.text", "a"),
            MockCompiler::echo(),
        );
        let email = Email::new().put_template(TemplateId::file("a.text"));
        assert!(matches!(renderer.render_template(&email), Err(Error::MissingView)));
    }

    #[test]
    fn render_records_view_and_template() {
        let (renderer, _dir) = renderer(
            RecordingViewEngine::new().with_template("emails", "a.text", "a"),
            MockCompiler::echo(),
        );
        let rendered = renderer
            .render("emails", &Email::new(), TemplateId::file("a.text"), Assigns::new())
            .unwrap();

        assert_eq!(rendered.private.view_module.as_deref(), Some("emails"));
        assert_eq!(rendered.private.view_template, Some(TemplateId::file("a.text")));
        assert_eq!(rendered.private.html_layout, Some(Layout::NoLayout));
        assert_eq!(rendered.private.text_layout, Some(Layout::NoLayout));
    }

    #[test]
    fn render_leaves_input_untouched() {
        let (renderer, _dir) = renderer(
            RecordingViewEngine::new().with_template("emails", "a.text", "a"),
            MockCompiler::echo(),
        );
        let email = Email::new().assign("user", "Alice");
        let before = email.clone();

        let rendered = renderer
            .render("emails", &email, TemplateId::file("a.text"), Assigns::new())
            .unwrap();

        assert_eq!(email, before);
        assert_ne!(rendered, before);
    }

    #[test]
    fn layouts_reach_the_engine() {
        let engine = RecordingViewEngine::new()
            .with_template("emails", "welcome.html.mjml", "<mjml/>")
            .with_template("emails", "welcome.text", "hi");
        let (renderer, _dir) = renderer(engine, MockCompiler::echo());
        let email = Email::new().put_layout("layouts", "email");

        renderer
            .render("emails", &email, TemplateId::name("welcome"), Assigns::new())
            .unwrap();

        let calls = renderer.engine().calls();
        assert_eq!(calls[0].layout, Layout::template("layouts", "email.html.mjml"));
        assert_eq!(calls[1].layout, Layout::template("layouts", "email.text"));
    }

    #[test]
    fn dual_render_sets_nothing_when_text_fails() {
        let engine =
            RecordingViewEngine::new().with_template("emails", "welcome.html.mjml", "<mjml/>");
        let (renderer, _dir) = renderer(engine, MockCompiler::echo());

        let err = renderer
            .render("emails", &Email::new(), TemplateId::name("welcome"), Assigns::new())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(name) if name == "emails/welcome.text"));
    }

    #[test]
    fn from_config_uses_scratch_dir() {
        let config = CompilerConfig::default().scratch_dir("/var/tmp/mailview");
        let renderer = Renderer::from_config(RecordingViewEngine::new(), &config);
        assert_eq!(renderer.scratch_path(), Path::new("/var/tmp/mailview"));
        assert_eq!(renderer.compiler().program(), "mjml");
    }
}
