#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use locallingua::app_config::{self, Config};
use locallingua::translation::{TranslationMode, TranslationOptions, TranslationRequest};
use locallingua::{Controller, LANGUAGES, server};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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

/// CLI Wrapper for TranslationMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMode {
    Smart,
    Literal,
    Natural,
}

impl From<CliMode> for TranslationMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Smart => TranslationMode::Smart,
            CliMode::Literal => TranslationMode::Literal,
            CliMode::Natural => TranslationMode::Natural,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default command)
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Translate a single text and print the result
    Translate(TranslateArgs),

    /// List the supported languages
    Languages,

    /// Generate shell completions for locallingua
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    to: String,

    /// Source language code, or 'auto'
    #[arg(short, long, default_value = "auto")]
    from: String,

    /// Translation mode
    #[arg(short, long, value_enum, default_value = "smart")]
    mode: CliMode,

    /// Sampling temperature (0 to 2)
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Nucleus sampling (0 to 1)
    #[arg(long, default_value_t = 1.0)]
    top_p: f32,

    /// Maximum tokens to generate (1 to 2048)
    #[arg(long, default_value_t = 512)]
    max_tokens: u32,

    /// Sampling seed (-1 for random)
    #[arg(long, default_value_t = 42, allow_negative_numbers = true)]
    seed: i64,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

/// LocalLingua - local-first text translation
///
/// Translates text with a local GGUF model through llama.cpp. Nothing is sent
/// to a remote service.
#[derive(Parser, Debug)]
#[command(name = "locallingua")]
#[command(version)]
#[command(about = "Local-first translation service")]
#[command(long_about = "LocalLingua translates text with a local model served by llama.cpp.

EXAMPLES:
    locallingua                                   # Serve the HTTP API
    locallingua serve --port 9000                 # Serve on another port
    locallingua translate --to es 'Hello world'   # Translate one text
    locallingua languages                         # List supported languages
    locallingua completions bash > locallingua.bash

CONFIGURATION:
    Settings are read from locallingua.json when it exists. The environment
    variables LOCALLINGUA_MODEL_PATH, LOCALLINGUA_MODEL_NAME,
    LOCALLINGUA_MAX_CONCURRENCY, LOCALLINGUA_ALLOW_FAKE_TRANSLATOR and
    LOCALLINGUA_LLAMA_SERVER override the file. They may also be set in a
    .env file in the working directory.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LOCALLINGUA_CONFIG", default_value = "locallingua.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &options.command {
        let mut cmd = CommandLineOptions::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_with_env(&options.config)?;
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
    CustomLogger::init(config.log_level.to_level_filter())
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;
    debug!("Loaded configuration from {:?}", options.config);

    match options.command {
        None => run_serve(config, None, None).await,
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Translate(args)) => run_translate(config, args).await,
        Some(Commands::Languages) => {
            for lang in LANGUAGES {
                println!("{}\t{}", lang.code, lang.name);
            }
            Ok(())
        }
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let server_config = config.server.clone();
    let controller = Arc::new(Controller::with_config(config)?);
    server::serve(controller, &server_config).await
}

async fn run_translate(config: Config, args: TranslateArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let options = TranslationOptions {
        mode: args.mode.into(),
        temperature: args.temperature,
        top_p: args.top_p,
        max_tokens: args.max_tokens,
        seed: Some(args.seed),
    };
    let request = TranslationRequest::new(args.text, args.from, args.to).with_options(options);
    request.validate()?;

    let result = controller.translate(&request).await.map_err(|e| {
        error!("{}", e);
        anyhow!("[{}] {}", e.code(), e.public_message())
    })?;

    debug!(
        "used_mode={} detected={:?} confidence={:?} latency={}ms",
        result.used_mode, result.detected_source_lang, result.detection_confidence, result.latency_ms
    );

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&result).context("Failed to serialize the result")?;
        println!("{}", rendered);
    } else {
        println!("{}", result.translated_text);
    }
    Ok(())
}
