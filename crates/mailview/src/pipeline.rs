//! Markup to HTML through the external compiler.

use std::path::Path;

use mailview_pipe::{CompilerInvoker, ScratchFile};
use tracing::{debug, warn};

use crate::error::Error;

/// Compile `markup` to HTML with `compiler`, via a scratch file in `scratch_dir`.
///
/// The scratch file is removed on every path out of this function. When
/// compilation fails and removal fails too, the compilation error is the
/// one returned.
pub fn compile_markup<C>(compiler: &C, scratch_dir: &Path, markup: &str) -> Result<String, Error>
where
    C: CompilerInvoker + ?Sized,
{
    let scratch = ScratchFile::create_in(scratch_dir, markup)?;
    debug!(
        program = compiler.program(),
        input = %scratch.path().display(),
        "Compiling markup"
    );

    match compiler.compile(scratch.path()) {
        Ok(html) => {
            scratch.release()?;
            Ok(html)
        }
        Err(err) => {
            if let Err(cleanup) = scratch.release() {
                warn!(error = %cleanup, "Could not remove scratch file after failed compile");
            }
            Err(err.into())
        }
    }
}
