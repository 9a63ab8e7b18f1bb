//! Turn status-returning calls into `Result`s.
//!
//! Many C-style APIs report failure through their return value or a global
//! error slot. [`forward_call`] runs such a call, asks a condition whether it
//! failed, hands failures to a handler together with the caller's location, and
//! then runs a reset step (clearing `errno` and the like) no matter what the
//! handler decided.

use std::fmt;
use std::panic::Location;

#[cfg(windows)]
const SEPARATORS: &[char] = &['\\', '/'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

/// The last component of a source path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(SEPARATORS).next().unwrap_or(path)
}

/// Where a call was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// File name without directories.
    pub file: &'static str,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl CallSite {
    /// The location of whoever called the function this is used in.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: file_name(location.file()),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Run `func` and forward a failure to `handler`.
///
/// When `cond` reports the value as a failure, `handler` receives the call site
/// and the value. `reset` runs right after the handler, including when the
/// handler returns an error. When `cond` is false neither runs.
///
/// # Errors
///
/// Returns whatever error `handler` returns.
#[track_caller]
pub fn forward_call<R, E, F, C, H, Z>(reset: Z, handler: H, cond: C, func: F) -> Result<R, E>
where
    F: FnOnce() -> R,
    C: FnOnce(&R) -> bool,
    H: FnOnce(&CallSite, &R) -> Result<(), E>,
    Z: FnOnce(&mut R),
{
    let site = CallSite::caller();
    let mut value = func();
    if !cond(&value) {
        return Ok(value);
    }

    log::debug!("forwarding failed call at {site}");
    let handled = handler(&site, &value);
    reset(&mut value);
    handled.map(|()| value)
}
