//! Detection of the executable path at the front of an argument list.

use std::io;
use std::path::{Path, PathBuf};

/// Source of the running program's resolved executable path.
pub trait ExecutableLocator {
    fn current_executable(&self) -> io::Result<PathBuf>;
}

/// Resolves the path of the current process through the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentExecutable;

impl ExecutableLocator for CurrentExecutable {
    fn current_executable(&self) -> io::Result<PathBuf> {
        std::env::current_exe()?.canonicalize()
    }
}

/// Whether `token` names the executable reported by `locator`.
///
/// Any failure to resolve either path counts as "no".
pub fn is_executable_path(token: &str, locator: &dyn ExecutableLocator) -> bool {
    let executable = match locator.current_executable() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(error = %err, "could not resolve current executable");
            return false;
        }
    };

    let candidate = std::path::absolute(Path::new(token)).and_then(|p| p.canonicalize());
    match candidate {
        Ok(candidate) => candidate == executable,
        Err(_) => false,
    }
}

/// Drop the first token if it is the path of the running executable.
pub fn strip_executable<'a, S: AsRef<str>>(
    args: &'a [S],
    locator: &dyn ExecutableLocator,
) -> &'a [S] {
    match args.split_first() {
        Some((first, rest)) if is_executable_path(first.as_ref(), locator) => {
            tracing::debug!(executable = first.as_ref(), "stripped executable path");
            rest
        }
        _ => args,
    }
}
