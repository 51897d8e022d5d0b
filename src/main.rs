// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use captioner::app_config::{self, Config, SubtitleFormat};
use captioner::app_controller::{Controller, FileOutcome};

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

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Vtt,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Vtt => SubtitleFormat::Vtt,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate subtitles from word-level transcripts (default command)
    Generate(GenerateArgs),

    /// Check an existing subtitle file against the captioning rules
    Analyze {
        /// SRT or WebVTT file to check
        #[arg(value_name = "SUBTITLE_FILE")]
        subtitle_file: PathBuf,

        /// Language of the subtitles (e.g., 'en', 'zh')
        #[arg(short, long)]
        language: Option<String>,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for captioner
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Transcript JSON file or directory of transcripts
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Language code (e.g., 'en', 'zh'); defaults to the transcript's own
    #[arg(short, long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Output subtitle format
    #[arg(long, value_enum)]
    format: Option<CliSubtitleFormat>,

    /// Prefix cues with the speaker label when the speaker changes
    #[arg(long)]
    speaker_labels: bool,

    /// Treat the transcripts of a directory as consecutive chunks of one recording
    #[arg(long)]
    merge_chunks: bool,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// captioner - word-level transcripts to readable subtitles
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(version)]
#[command(about = "Turn word-level speech-to-text transcripts into subtitle files")]
#[command(long_about = "captioner groups transcript words into timed cues and lays each cue out on at most two lines, without ever dropping content.

EXAMPLES:
    captioner talk.json                        # Write talk.<lang>.srt next to the transcript
    captioner -l zh talk.json                  # Force Chinese layout rules
    captioner --format vtt talk.json           # Write WebVTT instead of SRT
    captioner -f --log-level debug /transcripts/  # Process a whole directory
    captioner --merge-chunks /episode_01/      # One subtitle file from chunked transcripts
    captioner analyze talk.en.srt              # Report rule violations in a subtitle file
    captioner completions bash > captioner.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Transcript JSON file or directory of transcripts
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Language code (e.g., 'en', 'zh'); defaults to the transcript's own
    #[arg(short, long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Output subtitle format
    #[arg(long, value_enum)]
    format: Option<CliSubtitleFormat>,

    /// Prefix cues with the speaker label when the speaker changes
    #[arg(long)]
    speaker_labels: bool,

    /// Treat the transcripts of a directory as consecutive chunks of one recording
    #[arg(long)]
    merge_chunks: bool,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
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
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "captioner", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Analyze {
            subtitle_file,
            language,
            config_path,
        }) => run_analyze(&subtitle_file, language.as_deref(), &config_path),
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            run_generate(GenerateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                language: cli.language,
                config_path: cli.config_path,
                format: cli.format,
                speaker_labels: cli.speaker_labels,
                merge_chunks: cli.merge_chunks,
                log_level: cli.log_level,
            })
            .await
        }
    }
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Command line wins over the config file
    if let Some(language) = &options.language {
        config.language = language.clone();
    }
    if let Some(format) = &options.format {
        config.output.format = format.clone().into();
    }
    if options.speaker_labels {
        config.output.speaker_labels = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let output_dir = options.input_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        if let FileOutcome::Skipped(path) = controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await?
        {
            info!("Nothing to do, {} already exists", path.display());
        }
    } else if options.input_path.is_dir() && options.merge_chunks {
        if let FileOutcome::Skipped(path) = controller
            .run_chunks(options.input_path.clone(), options.force_overwrite)
            .await?
        {
            info!("Nothing to do, {} already exists", path.display());
        }
    } else if options.input_path.is_dir() {
        let summary = controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
        if summary.errors > 0 {
            return Err(anyhow!("{} transcript(s) failed", summary.errors));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn run_analyze(subtitle_file: &Path, language: Option<&str>, config_path: &str) -> Result<()> {
    let config = load_or_create_config(config_path)?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;
    let report = controller.analyze(subtitle_file, language)?;

    print!("{}", report);
    for issue in &report.issues {
        println!("  #{}: {}", issue.seq_num, issue.message);
    }

    Ok(())
}
