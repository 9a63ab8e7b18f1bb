//! Small building blocks for terminal tools.
//!
//! This crate provides:
//! - A command-line tokenizer and command dispatcher
//! - Fixed-size character grids with optional per-cell data
//! - ANSI color helpers behind a global switch
//! - N-dimensional coordinates, `const` integer math, and scope guards
//! - Configuration loading, XDG path resolution, and schema generation

pub mod cmdparser;
pub mod colors;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod forward;
pub mod guard;
pub mod math;
pub mod paths;
pub mod platform;
pub mod schema;
pub mod screen;

pub use cmdparser::{CmdParser, Command, CommandInfo, ParsedArgs, ParsedCommandLine, TokenSyntax};
pub use colors::Color;
pub use config::{AppConfig, LogLevel, LoggingConfig, OutputConfig, ParserConfig};
pub use coordinate::{Coordinate, Point, TriPoint};
pub use error::{CoreError, ParseError, Result};
pub use paths::AppPaths;
pub use schema::{generate_example_config, generate_schema, write_generated_files};
pub use screen::{AnnotatedScreen, AsciiScreen};

/// Application name used for config directories and environment prefix.
pub const APP_NAME: &str = "tinytools";

/// Returns the environment variable prefix for this application.
#[must_use]
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
