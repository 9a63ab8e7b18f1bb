//! Argv-style token classification and named-command dispatch.
//!
//! The first token names a command. Every following token is one of:
//!
//! - an option: `--verbose`, or `--level=3`
//! - a key-value pair: `name=value`
//! - a positional value: `value`
//!
//! Values may be wrapped in delimiters (`[` and `]` by default) so that a value
//! split by the shell, such as `title=[hello world]`, is read back as one value.
//!
//! Registration, parsing and dispatch happen in that order and the types enforce it:
//! [`CmdParser`] collects handlers, [`CmdParser::parse`] consumes it and yields an
//! immutable [`ParsedCommandLine`], and only that can [`exec`](ParsedCommandLine::exec).

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};

use crate::error::{CoreError, ParseError, Result};

/// Default opening delimiter for values.
pub const DEFAULT_BEGIN: char = '[';

/// Default closing delimiter for values.
pub const DEFAULT_END: char = ']';

const OPTION_PREFIX: &str = "--";

/// How tokens are delimited and how malformed ones are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSyntax {
    /// Opens a delimited value.
    pub begin: char,
    /// Closes a delimited value.
    pub end: char,
    /// Fail on malformed tokens instead of keeping them as positional values.
    pub strict: bool,
}

impl Default for TokenSyntax {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN,
            end: DEFAULT_END,
            strict: true,
        }
    }
}

impl TokenSyntax {
    /// Set the malformed-token policy.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A `--name` or `--name=value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdOption {
    /// Name without the leading `--`.
    pub name: String,
    /// Present for `--name=value`.
    pub value: Option<String>,
}

/// A `key=value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Text before the first `=`.
    pub key: String,
    /// Text after the first `=`, delimiters stripped.
    pub value: String,
}

/// The classified token line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    command: String,
    options: Vec<CmdOption>,
    pairs: Vec<KeyValue>,
    values: Vec<String>,
    raw: String,
}

impl ParsedArgs {
    /// The command name (first token).
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Options in input order.
    #[must_use]
    pub fn options(&self) -> &[CmdOption] {
        &self.options
    }

    /// Key-value pairs in input order.
    #[must_use]
    pub fn pairs(&self) -> &[KeyValue] {
        &self.pairs
    }

    /// Positional values in input order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// All tokens, including the command, joined by single spaces.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether `--name` (with or without a value) was given.
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|opt| opt.name == name)
    }

    /// Value of the first `--name=value` option.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .filter(|opt| opt.name == name)
            .find_map(|opt| opt.value.as_deref())
    }

    /// Value of the first pair with this key.
    #[must_use]
    pub fn pair(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }
}

enum Classified {
    Option(CmdOption),
    Pair(KeyValue),
    Value(String),
}

/// Classify a token line.
///
/// The same tokens and syntax always produce the same result.
///
/// # Errors
///
/// Returns [`ParseError::MissingCommand`] when there is no non-empty first token.
/// In strict mode, returns [`ParseError::Malformed`] or [`ParseError::Unterminated`]
/// for the first token that fits no shape; in lenient mode such a token is kept
/// verbatim as a positional value.
pub fn tokenize<I, S>(tokens: I, syntax: &TokenSyntax) -> std::result::Result<ParsedArgs, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

    let command = match tokens.first() {
        Some(name) if !name.is_empty() => name.clone(),
        _ => return Err(ParseError::MissingCommand),
    };

    let mut parsed = ParsedArgs {
        command,
        raw: tokens.join(" "),
        ..ParsedArgs::default()
    };

    let mut at = 1;
    while at < tokens.len() {
        match classify(&tokens, at, syntax) {
            Ok((classified, next)) => {
                match classified {
                    Classified::Option(opt) => {
                        debug!("option --{} = {:?}", opt.name, opt.value);
                        parsed.options.push(opt);
                    }
                    Classified::Pair(pair) => {
                        debug!("pair {} = {:?}", pair.key, pair.value);
                        parsed.pairs.push(pair);
                    }
                    Classified::Value(value) => {
                        debug!("value {value:?}");
                        parsed.values.push(value);
                    }
                }
                at = next;
            }
            Err(err) if !syntax.strict => {
                warn!("{err}; keeping `{}` as a value", tokens[at]);
                parsed.values.push(tokens[at].clone());
                at += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(parsed)
}

/// Classify `tokens[at]`, returning the index of the next unread token.
fn classify(
    tokens: &[String],
    at: usize,
    syntax: &TokenSyntax,
) -> std::result::Result<(Classified, usize), ParseError> {
    let token = tokens[at].as_str();

    if let Some(body) = token.strip_prefix(OPTION_PREFIX) {
        return match body.split_once('=') {
            _ if body.is_empty() => Err(malformed(token, "option name is empty")),
            Some(("", _)) => Err(malformed(token, "option name is empty")),
            Some((name, value)) => {
                let (value, next) = read_value(value, tokens, at, syntax)?;
                let opt = CmdOption {
                    name: name.to_string(),
                    value: Some(value),
                };
                Ok((Classified::Option(opt), next))
            }
            None => {
                let opt = CmdOption {
                    name: body.to_string(),
                    value: None,
                };
                Ok((Classified::Option(opt), at + 1))
            }
        };
    }

    // `[a=b]` is a delimited value, not a pair.
    if !token.starts_with(syntax.begin) {
        if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                return Err(malformed(token, "key is empty"));
            }
            let (value, next) = read_value(value, tokens, at, syntax)?;
            let pair = KeyValue {
                key: key.to_string(),
                value,
            };
            return Ok((Classified::Pair(pair), next));
        }
    }

    let (value, next) = read_value(token, tokens, at, syntax)?;
    Ok((Classified::Value(value), next))
}

/// Read a value whose first fragment is `first` (the value part of `tokens[at]`).
///
/// A delimited value continues through following tokens until one ends with the
/// closing delimiter.
fn read_value(
    first: &str,
    tokens: &[String],
    at: usize,
    syntax: &TokenSyntax,
) -> std::result::Result<(String, usize), ParseError> {
    let Some(opened) = first.strip_prefix(syntax.begin) else {
        return Ok((first.to_string(), at + 1));
    };

    if let Some(inner) = opened.strip_suffix(syntax.end) {
        return Ok((inner.to_string(), at + 1));
    }

    let mut value = opened.to_string();
    for (offset, fragment) in tokens[at + 1..].iter().enumerate() {
        value.push(' ');
        if let Some(last) = fragment.strip_suffix(syntax.end) {
            value.push_str(last);
            return Ok((value, at + offset + 2));
        }
        value.push_str(fragment);
    }

    Err(ParseError::Unterminated {
        token: tokens[at].clone(),
        end: syntax.end,
    })
}

fn malformed(token: &str, reason: &'static str) -> ParseError {
    ParseError::Malformed {
        token: token.to_string(),
        reason,
    }
}

/// Descriptive data a command exposes for help output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInfo {
    /// One-line invocation pattern, e.g. `paint color=[red] [text]`.
    pub usage: String,
    /// Short description.
    pub summary: String,
}

impl CommandInfo {
    /// Build from usage and summary text.
    pub fn new(usage: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            summary: summary.into(),
        }
    }
}

/// A named handler the parser can dispatch to.
pub trait Command {
    /// Name matched against the first token.
    fn name(&self) -> &str;

    /// Optional help data.
    fn info(&self) -> Option<CommandInfo> {
        None
    }

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Whatever the command reports; [`ParsedCommandLine::exec`] wraps it in
    /// [`CoreError::CommandFailed`].
    fn perform(&self, line: &ParsedCommandLine) -> anyhow::Result<()>;
}

type Handler = Box<dyn Fn(&ParsedCommandLine) -> anyhow::Result<()>>;

/// A [`Command`] backed by a closure.
pub struct FnCommand {
    name: String,
    info: Option<CommandInfo>,
    handler: Handler,
}

impl FnCommand {
    /// Wrap a closure under `name`.
    pub fn new<F>(name: impl Into<String>, handler: F, info: Option<CommandInfo>) -> Self
    where
        F: Fn(&ParsedCommandLine) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            info,
            handler: Box::new(handler),
        }
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> Option<CommandInfo> {
        self.info.clone()
    }

    fn perform(&self, line: &ParsedCommandLine) -> anyhow::Result<()> {
        (self.handler)(line)
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Registered commands by name.
pub type CommandTable = BTreeMap<String, Box<dyn Command>>;

/// Registration phase: owns the raw tokens and the command table.
pub struct CmdParser {
    tokens: Vec<String>,
    syntax: TokenSyntax,
    commands: CommandTable,
}

impl CmdParser {
    /// Start from a token list that does not include the program name.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            syntax: TokenSyntax::default(),
            commands: CommandTable::new(),
        }
    }

    /// Start from the process arguments, skipping the program name.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    /// Replace the token syntax.
    #[must_use]
    pub fn with_syntax(mut self, syntax: TokenSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Register a command. A later registration under the same name wins.
    pub fn add(&mut self, command: Box<dyn Command>) -> &mut Self {
        let name = command.name().to_string();
        if self.commands.insert(name.clone(), command).is_some() {
            warn!("command `{name}` registered twice; keeping the later handler");
        }
        self
    }

    /// Register a closure as a command.
    pub fn add_fn<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
        info: Option<CommandInfo>,
    ) -> &mut Self
    where
        F: Fn(&ParsedCommandLine) -> anyhow::Result<()> + 'static,
    {
        self.add(Box::new(FnCommand::new(name, handler, info)))
    }

    /// The registered commands.
    #[must_use]
    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Look up a registered command.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Classify the tokens and move to the dispatch phase.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Parse`] when [`tokenize`] fails.
    pub fn parse(self) -> Result<ParsedCommandLine> {
        let args = tokenize(self.tokens, &self.syntax)?;
        debug!(
            "parsed `{}`: {} option(s), {} pair(s), {} value(s)",
            args.command(),
            args.options().len(),
            args.pairs().len(),
            args.values().len()
        );
        Ok(ParsedCommandLine {
            args,
            commands: self.commands,
        })
    }
}

impl fmt::Debug for CmdParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmdParser")
            .field("tokens", &self.tokens)
            .field("syntax", &self.syntax)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Dispatch phase: the classified tokens plus the command table.
pub struct ParsedCommandLine {
    args: ParsedArgs,
    commands: CommandTable,
}

impl ParsedCommandLine {
    /// The classified tokens.
    #[must_use]
    pub const fn args(&self) -> &ParsedArgs {
        &self.args
    }

    /// The parsed command name.
    #[must_use]
    pub fn command_name(&self) -> &str {
        self.args.command()
    }

    /// The registered commands.
    #[must_use]
    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Look up a registered command.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Run the handler registered under the parsed command name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CommandNotFound`] when no handler matches, or
    /// [`CoreError::CommandFailed`] when the handler fails.
    pub fn exec(&self) -> Result<()> {
        let name = self.command_name();
        let Some(command) = self.command(name) else {
            return Err(CoreError::CommandNotFound(name.to_string()));
        };

        info!("running command `{name}`");
        command
            .perform(self)
            .map_err(|err| CoreError::CommandFailed {
                name: name.to_string(),
                source: err.into(),
            })
    }
}

impl fmt::Debug for ParsedCommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedCommandLine")
            .field("args", &self.args)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
