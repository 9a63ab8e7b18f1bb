//! Configuration types and loading for the application.

use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cmdparser::{DEFAULT_BEGIN, DEFAULT_END, TokenSyntax};
use crate::error::CoreError;
use crate::paths::{expand_str_path, write_default_config};
use crate::{AppPaths, env_prefix};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(
    title = "Application Configuration",
    description = "Main configuration for tinytools"
)]
pub struct AppConfig {
    /// JSON Schema reference for editor support.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub schema: Option<String>,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Terminal output configuration.
    pub output: OutputConfig,

    /// Command token syntax.
    pub parser: ParserConfig,
}

impl AppConfig {
    /// Load configuration from file and environment, creating defaults if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or written.
    pub fn load(paths: &AppPaths, dry_run: bool) -> Result<Self> {
        if !paths.config_file.exists() {
            if dry_run {
                log::info!(
                    "dry-run: would create default config at {}",
                    paths.config_file.display()
                );
            } else {
                write_default_config(&paths.config_file)?;
            }
        }

        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_from_path(config_file: &Path) -> Result<Self> {
        let env_prefix = env_prefix();
        let environment = Environment::with_prefix(env_prefix.as_str()).separator("__");
        Self::load_layered(config_file, environment)
    }

    /// Defaults, then the TOML file, then `environment`.
    fn load_layered(config_file: &Path, environment: Environment) -> Result<Self> {
        let built = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("output.color", true)?
            .set_default("parser.begin", DEFAULT_BEGIN.to_string())?
            .set_default("parser.end", DEFAULT_END.to_string())?
            .set_default("parser.strict", true)?
            .add_source(
                File::from(config_file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(environment)
            .build()?;

        let mut config: Self = built.try_deserialize()?;

        if let Some(ref file) = config.logging.file {
            let expanded = expand_str_path(file)?;
            config.logging.file = Some(expanded.display().to_string());
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: None,
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "Logging configuration")]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace).
    #[schemars(default = "default_log_level")]
    pub level: LogLevel,

    /// Optional path for log file output. Supports ~ and environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Log level enumeration for schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only emit error-level messages.
    Error,
    /// Emit warnings and errors.
    Warn,
    /// Emit informational messages and above (default).
    #[default]
    Info,
    /// Emit debug diagnostics and above.
    Debug,
    /// Emit all messages including fine-grained traces.
    Trace,
}

impl LogLevel {
    /// The matching `log` filter.
    #[must_use]
    pub const fn to_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

const fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
        }
    }
}

/// Terminal output configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "Terminal output configuration")]
pub struct OutputConfig {
    /// Emit ANSI colors in command output. `--color` and `NO_COLOR` still apply.
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Command token syntax configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "How `exec` tokens are delimited and validated")]
pub struct ParserConfig {
    /// Single character that opens a delimited value.
    pub begin: String,

    /// Single character that closes a delimited value.
    pub end: String,

    /// Reject malformed tokens instead of keeping them as positional values.
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN.to_string(),
            end: DEFAULT_END.to_string(),
            strict: true,
        }
    }
}

impl ParserConfig {
    /// Validate the delimiters and build the token syntax.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] unless `begin` and `end` are single characters.
    pub fn syntax(&self) -> crate::error::Result<TokenSyntax> {
        Ok(TokenSyntax {
            begin: single_char("parser.begin", &self.begin)?,
            end: single_char("parser.end", &self.end)?,
            strict: self.strict,
        })
    }
}

fn single_char(key: &str, text: &str) -> crate::error::Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CoreError::Config(format!(
            "{key} must be exactly one character, got {text:?}"
        ))),
    }
}
