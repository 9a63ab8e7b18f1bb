mod builtin;

use std::cell::RefCell;
use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use env_logger::fmt::WriteStyle;
use log::{LevelFilter, debug, info};

use tinytools_core::cmdparser::CmdParser;
use tinytools_core::colors;
use tinytools_core::guard::InitGuard;
use tinytools_core::paths::write_default_config;
use tinytools_core::{AppConfig, AppPaths, CoreError, generate_schema, platform};

const APP_NAME: &str = tinytools_core::APP_NAME;
const REPO_URL: &str = env!("CARGO_PKG_REPOSITORY");

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging()?;
    debug!("resolved paths: {:#?}", ctx.paths);

    match cli.command {
        Command::Exec(cmd) => handle_exec(&ctx, cmd),
        Command::Init(cmd) => handle_init(&ctx, &cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => {
            handle_completions(shell);
            Ok(())
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run small terminal utilities through a bracket-aware command parser.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    pub quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    pub debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    pub trace: bool,
    /// Output machine readable JSON
    #[arg(long, global = true, conflicts_with = "yaml")]
    pub json: bool,
    /// Output machine readable YAML
    #[arg(long, global = true)]
    pub yaml: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    pub no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    pub color: ColorOption,
    /// Do not change anything on disk
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
    /// Assume "yes" for interactive prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,
    /// Emit additional diagnostics for troubleshooting
    #[arg(long = "diagnostics", global = true)]
    pub diagnostics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a built-in command line, e.g. `exec paint color=red hello`
    Exec(ExecCommand),
    /// Create config directories and default files
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
struct ExecCommand {
    /// Keep malformed tokens as plain values instead of failing
    #[arg(long)]
    lenient: bool,
    /// Command name followed by its --options, key=value pairs and values
    #[arg(
        value_name = "TOKENS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tokens: Vec<String>,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
    /// Print all resolved paths (config file, config dir, executable dir)
    Paths,
    /// Print the JSON schema for the config file
    Schema,
    /// Regenerate the default configuration file
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone())?;
        let config = AppConfig::load(&paths, common.dry_run)?;
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

        builder.filter_level(self.effective_log_level());

        if let Some(ref file) = self.config.logging.file {
            let sink = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .with_context(|| format!("opening log file {file}"))?;
            builder.target(env_logger::Target::Pipe(Box::new(sink)));
            builder.write_style(WriteStyle::Never);
        } else if !self.colors_wanted(&io::stderr()) {
            builder.write_style(WriteStyle::Never);
        } else if self.color_forced() {
            builder.write_style(WriteStyle::Always);
        } else {
            builder.write_style(WriteStyle::Auto);
        }

        if self.common.diagnostics {
            builder.format_timestamp_millis();
            builder.format_module_path(true);
            builder.format_target(true);
        }

        builder.try_init().or_else(|err| {
            if self.common.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
            Ok(())
        })
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => self.config.logging.level.to_filter(),
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    fn color_forced(&self) -> bool {
        self.common.color == ColorOption::Always || env::var_os("FORCE_COLOR").is_some()
    }

    /// Whether ANSI escapes should be written to `stream`.
    fn colors_wanted(&self, stream: &impl IsTerminal) -> bool {
        if self.common.no_color
            || self.common.color == ColorOption::Never
            || env::var_os("NO_COLOR").is_some()
        {
            return false;
        }
        self.color_forced() || (self.config.output.color && stream.is_terminal())
    }
}

fn handle_exec(ctx: &RuntimeContext, cmd: ExecCommand) -> Result<()> {
    let mut syntax = ctx.config.parser.syntax()?;
    if cmd.lenient {
        syntax = syntax.with_strict(false);
    }

    let wanted = ctx.colors_wanted(&io::stdout());
    let _colors = InitGuard::new(
        || colors::set_enabled(wanted),
        |previous| {
            colors::set_enabled(*previous);
        },
    );

    let out: builtin::Output = Rc::new(RefCell::new(io::stdout()));
    let mut parser = CmdParser::new(cmd.tokens).with_syntax(syntax);
    builtin::register(&mut parser, &out);

    let line = parser.parse()?;
    if ctx.common.dry_run {
        info!("dry-run: would run `{}`", line.args().raw());
        return Ok(());
    }
    line.exec().map_err(|err| match err {
        CoreError::CommandNotFound(_) => {
            anyhow!("{err}; run `{APP_NAME} exec help` to list commands")
        }
        other => other.into(),
    })
}

fn handle_init(ctx: &RuntimeContext, cmd: &InitCommand) -> Result<()> {
    if ctx.paths.config_file.exists() && !(cmd.force || ctx.common.assume_yes) {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.config_file.display()
        ));
    }

    if ctx.common.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.paths.config_file.display()
        );
        return Ok(());
    }

    write_default_config(&ctx.paths.config_file)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ctx.config)
                        .context("serializing config to JSON")?
                );
            } else if ctx.common.yaml {
                println!(
                    "{}",
                    serde_yaml::to_string(&ctx.config).context("serializing config to YAML")?
                );
            } else {
                println!("{:#?}", ctx.config);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            Ok(())
        }
        ConfigCommand::Paths => {
            let config_dir = ctx.paths.config_dir().map(PathBuf::from);
            let exe_dir = platform::executable_dir()?;
            if ctx.common.json || ctx.common.yaml {
                let paths = serde_json::json!({
                    "config": ctx.paths.config_file,
                    "config_dir": config_dir,
                    "executable_dir": exe_dir,
                });
                let rendered = if ctx.common.json {
                    serde_json::to_string_pretty(&paths).context("serializing paths to JSON")?
                } else {
                    serde_yaml::to_string(&paths).context("serializing paths to YAML")?
                };
                println!("{rendered}");
            } else {
                println!("config:     {}", ctx.paths.config_file.display());
                if let Some(dir) = config_dir {
                    println!("config dir: {}", dir.display());
                }
                println!("executable: {}", exe_dir.display());
            }
            Ok(())
        }
        ConfigCommand::Schema => {
            println!("{}", generate_schema(APP_NAME, REPO_URL)?);
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                info!(
                    "dry-run: would reset config at {}",
                    ctx.paths.config_file.display()
                );
                return Ok(());
            }
            write_default_config(&ctx.paths.config_file)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exec_keeps_hyphenated_tokens() {
        let cli = Cli::try_parse_from([
            APP_NAME, "--quiet", "exec", "screen", "--border", "text=[hi", "there]",
        ])
        .expect("parse");
        assert!(cli.common.quiet);
        let Command::Exec(cmd) = cli.command else {
            panic!("expected exec");
        };
        assert!(!cmd.lenient);
        assert_eq!(cmd.tokens, vec!["screen", "--border", "text=[hi", "there]"]);
    }

    #[test]
    fn exec_requires_tokens() {
        assert!(Cli::try_parse_from([APP_NAME, "exec"]).is_err());
    }

    fn context(args: &[&str]) -> RuntimeContext {
        let argv = [APP_NAME].iter().chain(args).chain(&["config", "path"]).copied();
        let cli = Cli::try_parse_from(argv).expect("parse");
        RuntimeContext {
            common: cli.common,
            paths: AppPaths {
                config_file: PathBuf::from("/tmp/tinytools-test/config.toml"),
            },
            config: AppConfig::default(),
        }
    }

    #[test]
    fn verbosity_flags_override_config_level() {
        assert_eq!(context(&[]).effective_log_level(), LevelFilter::Info);
        assert_eq!(context(&["-v"]).effective_log_level(), LevelFilter::Debug);
        assert_eq!(context(&["-vv"]).effective_log_level(), LevelFilter::Trace);
        assert_eq!(context(&["--trace"]).effective_log_level(), LevelFilter::Trace);

        let mut quiet_config = context(&[]);
        quiet_config.config.logging.level = tinytools_core::LogLevel::Warn;
        assert_eq!(quiet_config.effective_log_level(), LevelFilter::Warn);
    }

    #[test]
    fn color_can_be_switched_off() {
        assert!(!context(&["--no-color"]).colors_wanted(&io::stdout()));
        assert!(!context(&["--color", "never"]).colors_wanted(&io::stdout()));
    }
}
