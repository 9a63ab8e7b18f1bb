//! Error types for the core library.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is present but unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A filesystem location could not be resolved.
    #[error("path error: {0}")]
    Path(String),

    /// Underlying I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The token line could not be classified.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No handler is registered under the parsed command name.
    #[error("unknown command: {0}")]
    CommandNotFound(String),

    /// A registered handler returned an error.
    #[error("command `{name}` failed: {source}")]
    CommandFailed {
        /// Name the handler was registered under.
        name: String,
        /// The handler's error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A grid cell has no side data attached.
    #[error("no cell data at ({x}, {y})")]
    MissingCellData {
        /// Column of the cell.
        x: usize,
        /// Row of the cell.
        y: usize,
    },

    /// Text that should describe a coordinate does not.
    #[error("invalid coordinate `{input}`: {reason}")]
    InvalidCoordinate {
        /// The rejected text.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Errors produced while classifying command-line tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token list was empty or started with an empty token.
    #[error("parameter parsing error: a leading token naming the command is required")]
    MissingCommand,

    /// A token fits none of the accepted shapes.
    #[error(
        "parameter parsing error: `{token}` isn't an option (--option, --option=value), \
         a key-value pair (key=value) or a value: {reason}"
    )]
    Malformed {
        /// The offending token.
        token: String,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// A delimited value was opened but never closed.
    #[error("parameter parsing error: `{token}` opens a value that is never closed with `{end}`")]
    Unterminated {
        /// The token that opened the value.
        token: String,
        /// The closing delimiter that was expected.
        end: char,
    },
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
