//! ANSI color helpers with a process-wide on/off switch.
//!
//! Coloring is on by default. When it is off, every helper returns its input
//! unchanged and every escape accessor returns an empty string, so callers never
//! need to branch on the switch themselves.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Escape that starts green text.
pub const BEGIN_GREEN: &str = "\x1b[32m";
/// Escape that starts yellow text.
pub const BEGIN_YELLOW: &str = "\x1b[33m";
/// Escape that starts red text.
pub const BEGIN_RED: &str = "\x1b[31m";
/// Escape that starts bold blue text.
pub const BEGIN_BLUE: &str = "\x1b[1;34m";
/// Escape that restores the default style.
pub const COLOR_RESET: &str = "\x1b[0m";

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether helpers currently emit escapes.
#[must_use]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Turn escapes on or off for the whole process, returning the previous setting.
pub fn set_enabled(on: bool) -> bool {
    ENABLED.swap(on, Ordering::Relaxed)
}

/// The colors the helpers know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// `\x1b[32m`
    Green,
    /// `\x1b[33m`
    Yellow,
    /// `\x1b[31m`
    Red,
    /// `\x1b[1;34m`
    Blue,
}

impl Color {
    /// Every color, in declaration order.
    pub const ALL: [Self; 4] = [Self::Green, Self::Yellow, Self::Red, Self::Blue];

    /// The escape for this color regardless of the switch.
    #[must_use]
    pub const fn escape(self) -> &'static str {
        match self {
            Self::Green => BEGIN_GREEN,
            Self::Yellow => BEGIN_YELLOW,
            Self::Red => BEGIN_RED,
            Self::Blue => BEGIN_BLUE,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }

    /// The escape that starts this color, or `""` when colors are off.
    #[must_use]
    pub fn begin(self) -> &'static str {
        if enabled() { self.escape() } else { "" }
    }

    /// `text` wrapped in this color and a reset, or `text` itself when colors are off.
    #[must_use]
    pub fn paint(self, text: &str) -> String {
        if enabled() {
            format!("{}{text}{COLOR_RESET}", self.escape())
        } else {
            text.to_string()
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a color name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color `{0}` (expected green, yellow, red or blue)")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// Wrap `text` in green.
#[must_use]
pub fn green(text: &str) -> String {
    Color::Green.paint(text)
}

/// Wrap `text` in yellow.
#[must_use]
pub fn yellow(text: &str) -> String {
    Color::Yellow.paint(text)
}

/// Wrap `text` in red.
#[must_use]
pub fn red(text: &str) -> String {
    Color::Red.paint(text)
}

/// Wrap `text` in bold blue.
#[must_use]
pub fn blue(text: &str) -> String {
    Color::Blue.paint(text)
}

/// The reset escape, or `""` when colors are off.
#[must_use]
pub fn reset() -> &'static str {
    if enabled() { COLOR_RESET } else { "" }
}
