use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
}

/// Everything a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Run `program` with `args` and capture both output streams.
///
/// Streams are drained on their own threads while the process runs, so a
/// child producing more output than a pipe buffer holds cannot stall.
///
/// # Arguments
///
/// * `program` - Path or name of the executable (no shell is involved)
/// * `args` - Arguments passed verbatim
/// * `timeout` - Optional timeout; if exceeded, the process and everything it
///   spawned are killed and the process is reaped
pub fn run_captured(
    program: &Path,
    args: &[&OsStr],
    timeout: Option<Duration>,
) -> Result<Captured, ShellError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Own process group, so a timeout can take down wrapper scripts' children.
        command.process_group(0);
    }
    let mut child = command.spawn()?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                kill_tree(&mut child)?;
                child.wait()?;
                // A descendant that left the group may still hold the pipes open;
                // the readers are detached rather than joined.
                drop(stdout);
                drop(stderr);
                return Err(ShellError::Timeout(duration));
            }
        },
        None => child.wait()?,
    };

    Ok(Captured {
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
        exit_code: status.code(),
    })
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: plain syscall; a negative pid addresses the group created at spawn.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        return Ok(());
    }
    Err(err)
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    child.kill()
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("output reader thread panicked"))?,
        None => Ok(Vec::new()),
    }
}
