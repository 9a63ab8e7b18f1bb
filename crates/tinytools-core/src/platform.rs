//! Where the running executable lives.

use std::env;
use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Full path of the running executable.
///
/// # Errors
///
/// Returns [`CoreError::Io`] when the platform cannot report it.
pub fn executable_path() -> Result<PathBuf> {
    Ok(env::current_exe()?)
}

/// Directory containing the running executable.
///
/// # Errors
///
/// Returns [`CoreError::Io`] when the executable path is unavailable, or
/// [`CoreError::Path`] when it has no parent directory.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = executable_path()?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| CoreError::Path(format!("{} has no parent directory", exe.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_dir_contains_the_executable() {
        let exe = executable_path().expect("current exe");
        let dir = executable_dir().expect("exe dir");
        assert!(dir.is_dir(), "{} is not a directory", dir.display());
        assert_eq!(exe.parent(), Some(dir.as_path()));
    }
}
