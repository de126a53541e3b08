//! Runs `CommandCompiler` against small shell scripts standing in for mjml.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use mailview_pipe::{CommandCompiler, CompilerConfig, CompilerInvoker, PipeError, ScratchFile};

// The scripts are run through `sh` so no exec bit is needed.
fn fake_compiler(dir: &Path, body: &str) -> CommandCompiler {
    let script = dir.join("fake-mjml.sh");
    fs::write(&script, format!("for last; do :; done\n{}\n", body)).unwrap();
    CommandCompiler::new("sh").flags([
        script.to_string_lossy().into_owned(),
        "-s".to_string(),
        "--config.validationLevel=skip".to_string(),
    ])
}

fn input(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("input.mjml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn compiles_file_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = fake_compiler(dir.path(), r#"sed -e 's/mjml/html/g' "$last""#);
    let path = input(dir.path(), "<mjml>Hi Alice</mjml>");

    assert_eq!(compiler.compile(&path).unwrap(), "<html>Hi Alice</html>");
}

#[test]
fn receives_flags_before_path() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = fake_compiler(dir.path(), r#"printf '%s|' "$@""#);
    let path = input(dir.path(), "");

    let out = compiler.compile(&path).unwrap();
    assert_eq!(
        out,
        format!("-s|--config.validationLevel=skip|{}|", path.display())
    );
}

#[test]
fn nonzero_exit_is_compilation_failed() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = fake_compiler(
        dir.path(),
        r#"echo "<html>half"; echo "Invalid MJML" >&2; exit 1"#,
    );
    let path = input(dir.path(), "<mjml>");

    let invocation = compiler.invoke(&path).unwrap();
    assert_eq!(invocation.exit_code, Some(1));
    assert_eq!(invocation.stderr, "Invalid MJML");

    match compiler.compile(&path).unwrap_err() {
        PipeError::CompilationFailed {
            program,
            exit_code,
            stderr,
        } => {
            assert_eq!(program, "sh");
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "Invalid MJML");
        }
        other => panic!("expected CompilationFailed, got {other:?}"),
    }
}

#[test]
fn hung_compiler_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let compiler =
        fake_compiler(dir.path(), "exec sleep 5").with_timeout(Duration::from_millis(200));
    let path = input(dir.path(), "");

    let start = Instant::now();
    let err = compiler.compile(&path).unwrap_err();
    assert!(matches!(err, PipeError::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn wrapper_script_child_is_killed_on_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let compiler =
        fake_compiler(dir.path(), "sleep 3\necho done").with_timeout(Duration::from_millis(200));
    let path = input(dir.path(), "");

    let start = Instant::now();
    let err = compiler.compile(&path).unwrap_err();
    assert!(matches!(err, PipeError::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn compiles_from_scratch_file() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = fake_compiler(dir.path(), r#"cat "$last""#);
    let scratch = ScratchFile::create_in(dir.path(), "<mjml><mj-body/></mjml>").unwrap();

    let html = compiler.compile(scratch.path()).unwrap();
    scratch.release().unwrap();

    assert_eq!(html, "<mjml><mj-body/></mjml>");
}

#[test]
fn config_drives_compiler() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fake.sh");
    fs::write(&script, "echo configured\n").unwrap();

    let yaml = format!(
        "program: sh\nflags: [\"{}\"]\ntimeout_secs: 5\n",
        script.display()
    );
    let config = CompilerConfig::from_yaml_str(&yaml).unwrap();
    let compiler = CommandCompiler::from_config(&config);

    assert_eq!(compiler.timeout(), Some(Duration::from_secs(5)));
    assert_eq!(compiler.compile(&script).unwrap(), "configured\n");
}
