//! `mailview` - render an email's bodies from a template directory.
//!
//! ```text
//! mailview --templates ./templates --view emails --name welcome \
//!     --assign user=Alice --assign 'items=["a","b"]' --layout email
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use mailview::{Assigns, CompilerConfig, Email, MiniJinjaViewEngine, Renderer, TemplateId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Env var holding a tracing filter such as `mailview=debug`.
const LOG_ENV: &str = "MAILVIEW_LOG";

/// Render the HTML and/or text body of an email
#[derive(Debug, Parser)]
#[command(name = "mailview", version, about)]
#[command(group(ArgGroup::new("template").required(true).args(["name", "file"])))]
struct Cli {
    /// Template root; templates live at <TEMPLATES>/<VIEW>/<TEMPLATE>
    #[arg(short, long, value_name = "DIR")]
    templates: PathBuf,

    /// View (subdirectory) holding the template
    #[arg(long)]
    view: String,

    /// Template root name; renders <NAME>.html.mjml and <NAME>.text
    #[arg(short, long)]
    name: Option<String>,

    /// Explicit template file name ending in .html.mjml or .text
    #[arg(short, long)]
    file: Option<String>,

    /// Template binding; the value is parsed as JSON, falling back to a string
    #[arg(short, long = "assign", value_name = "KEY=VALUE", value_parser = parse_assign)]
    assigns: Vec<(String, serde_json::Value)>,

    /// JSON object of template bindings, applied before --assign
    #[arg(long, value_name = "JSON")]
    assigns_json: Option<String>,

    /// Layout root inside --layout-view, for both bodies
    #[arg(short, long)]
    layout: Option<String>,

    /// View holding the layout templates
    #[arg(long, default_value = "layouts")]
    layout_view: String,

    /// YAML compiler configuration
    #[arg(short, long, env = "MAILVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Compiler program, overriding the config file
    #[arg(long, value_name = "PROGRAM")]
    compiler: Option<String>,

    /// Compiler timeout in seconds, overriding the config file; 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    debug!(?config, "Loaded compiler config");

    let email = build_email(&cli)?;
    let template = match (&cli.name, &cli.file) {
        (Some(name), _) => TemplateId::name(name.clone()),
        (None, Some(file)) => TemplateId::file(file.clone()),
        (None, None) => bail!("either --name or --file is required"),
    };

    let renderer = Renderer::from_config(MiniJinjaViewEngine::from_dir(&cli.templates), &config);
    let rendered = renderer
        .render(&cli.view, &email, template.clone(), Assigns::new())
        .with_context(|| format!("failed to render {} from view `{}`", template, cli.view))?;

    print!("{}", format_bodies(&rendered));
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<CompilerConfig> {
    let mut config = match &cli.config {
        Some(path) => CompilerConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CompilerConfig::default(),
    };
    if let Some(program) = &cli.compiler {
        config = config.program(program.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.timeout_secs((secs > 0).then_some(secs));
    }
    Ok(config)
}

fn build_email(cli: &Cli) -> Result<Email> {
    let mut email = Email::new();

    if let Some(json) = &cli.assigns_json {
        let parsed: serde_json::Value =
            serde_json::from_str(json).context("--assigns-json is not valid JSON")?;
        let serde_json::Value::Object(map) = parsed else {
            bail!("--assigns-json must be a JSON object");
        };
        email = email.merge_assigns(map.into_iter().collect());
    }
    for (key, value) in &cli.assigns {
        email = email.assign(key.clone(), value.clone());
    }
    if let Some(root) = &cli.layout {
        email = email.put_layout(cli.layout_view.clone(), root);
    }
    Ok(email)
}

fn parse_assign(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn format_bodies(email: &Email) -> String {
    let mut out = String::new();
    for (label, body) in [("html", &email.html_body), ("text", &email.text_body)] {
        if let Some(body) = body {
            out.push_str(&format!("==> {} <==\n{}", label, body));
            if !body.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}
