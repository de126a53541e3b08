//! File-backed templates rendered through a real child process.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use mailview::{
    Assigns, CommandCompiler, CompilerConfig, Email, Error, MiniJinjaViewEngine, Renderer,
    TemplateId,
};
use serde_json::json;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn template_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "emails/welcome.html.mjml",
        "<mj-text>Hi {{ user }}</mj-text>",
    );
    write(root.path(), "emails/welcome.text", "Hi {{ user }}");
    write(
        root.path(),
        "layouts/email.html.mjml",
        "<mjml><mj-body>{{ inner_content }}</mj-body></mjml>",
    );
    write(
        root.path(),
        "layouts/email.text",
        "{{ inner_content }}\n-- {{ team }}",
    );
    root
}

/// A stand-in for `mjml -s`: swaps mjml tags for html tags.
fn fake_mjml(dir: &Path, body: &str) -> CommandCompiler {
    let script = dir.join("mjml.sh");
    fs::write(&script, format!("for last; do :; done\n{}\n", body)).unwrap();
    CommandCompiler::new("sh").flags([script.to_string_lossy().into_owned()])
}

#[test]
fn renders_and_compiles_with_layouts() {
    let templates = template_root();
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let compiler = fake_mjml(
        work.path(),
        r#"sed -e 's/<mjml>/<html>/; s/<\/mjml>/<\/html>/' "$last""#,
    );
    let renderer = Renderer::new(MiniJinjaViewEngine::from_dir(templates.path()), compiler)
        .scratch_dir(scratch.path());

    let email = Email::new()
        .assign("user", "Alice")
        .put_layout("layouts", "email");
    let extra: Assigns = [("team".to_string(), json!("The Team"))].into_iter().collect();

    let rendered = renderer
        .render("emails", &email, TemplateId::name("welcome"), extra)
        .unwrap();

    assert_eq!(
        rendered.html_body.as_deref().map(str::trim_end),
        Some("<html><mj-body><mj-text>Hi Alice</mj-text></mj-body></html>")
    );
    assert_eq!(rendered.text_body.as_deref(), Some("Hi Alice\n-- The Team"));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn failing_compiler_leaves_no_body_and_no_file() {
    let templates = template_root();
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let compiler = fake_mjml(work.path(), r#"echo "<html>partial"; exit 1"#);
    let renderer = Renderer::new(MiniJinjaViewEngine::from_dir(templates.path()), compiler)
        .scratch_dir(scratch.path());

    let result = renderer.render(
        "emails",
        &Email::new().assign("user", "Alice"),
        TemplateId::file("welcome.html.mjml"),
        Assigns::new(),
    );

    assert!(matches!(result, Err(Error::CompilationFailed(_))));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn slow_compiler_times_out_and_leaves_no_file() {
    let templates = template_root();
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let compiler = fake_mjml(work.path(), "sleep 3\necho '<html>late</html>'")
        .with_timeout(Duration::from_millis(200));
    let renderer = Renderer::new(MiniJinjaViewEngine::from_dir(templates.path()), compiler)
        .scratch_dir(scratch.path());

    let start = Instant::now();
    let result = renderer.render(
        "emails",
        &Email::new().assign("user", "Alice"),
        TemplateId::name("welcome"),
        Assigns::new(),
    );

    assert!(matches!(
        result,
        Err(Error::CompilerTimeout { timeout, .. }) if timeout == Duration::from_millis(200)
    ));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn missing_compiler_is_unavailable() {
    let templates = template_root();
    let scratch = tempfile::tempdir().unwrap();
    let config = CompilerConfig::default()
        .program("mailview-missing-mjml")
        .scratch_dir(scratch.path());
    let renderer = Renderer::from_config(MiniJinjaViewEngine::from_dir(templates.path()), &config);

    let err = renderer
        .render(
            "emails",
            &Email::new().assign("user", "Alice"),
            TemplateId::name("welcome"),
            Assigns::new(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::CompilerUnavailable(_)));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn text_only_never_spawns_compiler() {
    let templates = template_root();
    let scratch = tempfile::tempdir().unwrap();
    let renderer = Renderer::new(
        MiniJinjaViewEngine::from_dir(templates.path()),
        CommandCompiler::new("mailview-missing-mjml"),
    )
    .scratch_dir(scratch.path());

    let rendered = renderer
        .render(
            "emails",
            &Email::new().assign("user", "Alice"),
            TemplateId::file("welcome.text"),
            Assigns::new(),
        )
        .unwrap();

    assert_eq!(rendered.text_body.as_deref(), Some("Hi Alice"));
    assert_eq!(rendered.html_body, None);
}
