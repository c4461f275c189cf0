// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use mdlingo::app_config::{self, Config};
use mdlingo::app_controller::{Controller, FileOutcome, OutputTarget};
use mdlingo::errors::{AppError, TranslationError};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a Markdown file or every Markdown file in a directory (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for mdlingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Markdown file or directory to translate
    #[arg(value_name = "PATH")]
    input_path: Option<PathBuf>,

    /// Output file (single file input only)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Model name, or a shorthand: 3, 4, 4large
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Fragment size in estimated tokens
    #[arg(short, long)]
    fragment_size: Option<usize>,

    /// Minimum delay between API call starts, in milliseconds
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// Maximum number of concurrent API calls
    #[arg(short = 'j', long)]
    max_concurrent: Option<usize>,

    /// Target language code (e.g., 'zh', 'ja', 'fr')
    #[arg(short = 'l', long)]
    target_language: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "mdlingo.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Overwrite existing translations
    #[arg(long)]
    force: bool,

    /// Replace the input files with their translation
    #[arg(long, conflicts_with = "output")]
    in_place: bool,
}

/// mdlingo - Markdown translation with a language model
///
/// Translates long Markdown documents fragment by fragment, leaving fenced
/// code blocks and line breaks untouched.
#[derive(Parser, Debug)]
#[command(name = "mdlingo")]
#[command(version)]
#[command(about = "Translate Markdown documents with a language model")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "mdlingo translates Markdown documents with the OpenAI API, keeping code blocks and line breaks intact.

EXAMPLES:
    mdlingo docs/intro.md                        # Writes docs/intro.zh.md
    mdlingo -l ja -m 4 docs/intro.md             # Japanese, using gpt-4
    mdlingo -o out.md docs/intro.md              # Explicit output file
    mdlingo --in-place docs/                     # Translate a folder in place
    mdlingo -j 4 -i 500 docs/                    # At most 4 calls, 500ms apart
    mdlingo completions bash > mdlingo.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in mdlingo.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically. The API key may also
    be given with --api-key or the OPENAI_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Accept everything here; the effective level is set through log::set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialise logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "mdlingo", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    };

    if let Err(e) = result {
        let error = AppError::from(e);
        error!("{}", error);
        std::process::exit(error.exit_code());
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(model) = &options.model {
        config.api.model = model.clone();
    }
    if let Some(temperature) = options.temperature {
        config.api.temperature = temperature;
    }
    if let Some(fragment_size) = options.fragment_size {
        config.translation.fragment_size = fragment_size;
    }
    if let Some(interval) = options.interval {
        config.translation.api_call_interval_ms = interval;
    }
    if let Some(max_concurrent) = options.max_concurrent {
        config.translation.max_concurrent_requests = Some(max_concurrent);
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(api_key) = options.api_key.as_ref().filter(|k| !k.is_empty()) {
        config.api.api_key = api_key.clone();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = options.log_level {
        let level: app_config::LogLevel = cmd_log_level.into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("PATH is required when no subcommand is specified"))?;

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Configuration problems are reported before any file is touched
    config
        .validate()
        .map_err(|e| TranslationError::Configuration(format!("{:#}", e)))?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        let target = match (&options.output, options.in_place) {
            (Some(output), _) => OutputTarget::Path(output.clone()),
            (None, true) => OutputTarget::InPlace,
            (None, false) => OutputTarget::Beside,
        };

        match controller.run(&input_path, &target, options.force).await? {
            FileOutcome::Written(path) => info!("Translation done! Saved to {:?}.", path),
            FileOutcome::Skipped(path) => info!("Nothing to do, {:?} already exists.", path),
        }
    } else if input_path.is_dir() {
        if options.output.is_some() {
            return Err(anyhow!("--output can only be used with a single input file"));
        }

        let summary = controller
            .run_folder(&input_path, options.in_place, options.force)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
