// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use subtitler::app_config::{Config, LogLevel};
use subtitler::app_controller::Controller;
use subtitler::subtitle_processor::ExportOptions;
use subtitler::timecode;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe an audio or video file with the subtitle service
    Transcribe {
        /// Audio or video file
        #[arg(value_name = "MEDIA")]
        media: PathBuf,

        /// Transcript JSON to write (default: <media stem>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-time an edited transcript against its media
    Resync {
        /// Audio or video file
        #[arg(value_name = "MEDIA")]
        media: PathBuf,

        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-run speaker attribution guided by the current speakers
    Refine {
        /// Audio or video file
        #[arg(value_name = "MEDIA")]
        media: PathBuf,

        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename speakers, applied in the order given
    Rename {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Rename as OLD=NEW; repeat for several renames
        #[arg(short = 'm', long = "map", value_name = "OLD=NEW", value_parser = parse_rename, required = true)]
        renames: Vec<(String, String)>,

        /// Only relabel locally, do not commit to the service
        #[arg(long)]
        local: bool,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a segment at a character offset
    Split {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Segment index, 0-based
        index: usize,

        /// Character offset inside the segment text
        offset: usize,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a segment with the next one
    Merge {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Segment index, 0-based
        index: usize,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a segment's text
    SetText {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Segment index, 0-based
        index: usize,

        /// New text
        text: String,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a segment's speaker
    SetSpeaker {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Segment index, 0-based
        index: usize,

        /// Speaker name
        speaker: String,

        /// Write here instead of rewriting the transcript
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the segment and word active at a playback time
    Locate {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Playback time in seconds, or an SRT timestamp
        #[arg(value_parser = parse_seconds)]
        time: f64,
    },

    /// Convert an SRT file into a transcript
    Import {
        /// SRT file
        #[arg(value_name = "SRT")]
        srt: PathBuf,

        /// Transcript JSON to write (default: <srt stem>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a transcript as SRT subtitles
    Export {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// SRT file to write (default: <transcript stem>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prefix cues with "[speaker]: "
        #[arg(long, conflicts_with = "no_speakers")]
        speakers: bool,

        /// Do not prefix cues with the speaker
        #[arg(long)]
        no_speakers: bool,

        /// Wrap cue text into short lines
        #[arg(short, long)]
        wrap: bool,

        /// Maximum lines per cue when wrapping
        #[arg(long)]
        max_lines: Option<usize>,

        /// Maximum characters per line when wrapping
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Show statistics for a transcript
    Info {
        /// Transcript JSON or SRT file
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,
    },

    /// Check the subtitle service is reachable
    Ping,

    /// Generate shell completions for subtitler
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Subtitler - edit machine-generated transcripts and export subtitles
#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(version = "0.1.0")]
#[command(about = "Transcript editing and subtitle export tool")]
#[command(long_about = "Subtitler sends audio and video to a subtitle-generation service, lets you edit the
resulting transcript and exports it as SRT subtitles.

EXAMPLES:
    subtitler transcribe talk.mp4                  # Writes talk.json
    subtitler split talk.json 3 27                 # Split segment 3 after 27 characters
    subtitler rename talk.json -m SPEAKER_00=Alice # Rename and commit to the service
    subtitler resync talk.mp4 talk.json            # Re-time edited text
    subtitler export talk.json --wrap              # Writes talk.srt
    subtitler locate talk.json 00:01:02,500        # Segment playing at 62.5s
    subtitler completions bash > subtitler.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long = "force", global = true)]
    force_overwrite: bool,
}

fn parse_rename(value: &str) -> Result<(String, String), String> {
    let (old_name, new_name) = value
        .split_once('=')
        .ok_or_else(|| format!("expected OLD=NEW, got '{}'", value))?;

    if old_name.trim().is_empty() {
        return Err(format!("missing speaker to rename in '{}'", value));
    }

    Ok((old_name.trim().to_string(), new_name.trim().to_string()))
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    if let Ok(seconds) = value.parse::<f64>() {
        return Ok(seconds);
    }
    timecode::decode(value).map_err(|e| e.to_string())
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

    // @returns: ANSI colour and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
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
            let (colour, emoji) = Self::style_for_level(record.level());

            let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is lowered once the config is read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subtitler", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command, cli.force_overwrite).await
}

async fn run_command(controller: &Controller, command: Commands, force: bool) -> Result<()> {
    match command {
        Commands::Transcribe { media, output } => {
            let path = controller.transcribe(&media, output, force).await?;
            info!("Success: {:?}", path);
        }
        Commands::Resync { media, transcript, output } => {
            let path = controller.resync(&media, &transcript, output, force).await?;
            info!("Success: {:?}", path);
        }
        Commands::Refine { media, transcript, output } => {
            let path = controller.refine(&media, &transcript, output, force).await?;
            info!("Success: {:?}", path);
        }
        Commands::Rename { transcript, renames, local, output } => {
            let path = controller.rename(&transcript, &renames, !local, output, force).await?;
            info!("Success: {:?}", path);
        }
        Commands::Split { transcript, index, offset, output } => {
            report_edit(controller.split(&transcript, index, offset, output, force)?);
        }
        Commands::Merge { transcript, index, output } => {
            report_edit(controller.merge(&transcript, index, output, force)?);
        }
        Commands::SetText { transcript, index, text, output } => {
            report_edit(controller.set_text(&transcript, index, &text, output, force)?);
        }
        Commands::SetSpeaker { transcript, index, speaker, output } => {
            report_edit(controller.set_speaker(&transcript, index, &speaker, output, force)?);
        }
        Commands::Locate { transcript, time } => {
            let (transcript, cue) = controller.locate(&transcript, time)?;
            match cue.segment.and_then(|index| transcript.get(index).map(|segment| (index, segment))) {
                Some((index, segment)) => {
                    println!(
                        "#{} {} --> {} {}{}",
                        index,
                        timecode::encode(segment.start),
                        timecode::encode(segment.end),
                        segment.speaker.as_ref().map(|s| format!("[{}]: ", s)).unwrap_or_default(),
                        segment.trimmed_text()
                    );
                    let word = cue
                        .word
                        .and_then(|w| segment.words.as_ref().and_then(|words| words.get(w)));
                    if let Some(word) = word {
                        println!("word: {}", word.text.trim());
                    }
                }
                None => println!("No segment at {}", timecode::encode(time)),
            }
        }
        Commands::Import { srt, output } => {
            let path = controller.import_srt(&srt, output, force)?;
            info!("Success: {:?}", path);
        }
        Commands::Export { transcript, output, speakers, no_speakers, wrap, max_lines, max_chars } => {
            let mut options: ExportOptions = controller.config().export;
            if speakers {
                options.include_speaker = true;
            }
            if no_speakers {
                options.include_speaker = false;
            }
            if wrap {
                options.wrap = true;
            }
            if let Some(max_lines) = max_lines {
                options.max_lines = max_lines.max(1);
            }
            if let Some(max_chars) = max_chars {
                options.max_chars = max_chars.max(1);
            }

            let path = controller.export(&transcript, output, &options, force)?;
            info!("Success: {:?}", path);
        }
        Commands::Info { transcript } => {
            let stats = controller.info(&transcript)?;
            println!("Segments: {}", stats.segment_count);
            println!("Duration: {}", timecode::encode(stats.total_duration));
            println!("Words:    {}", stats.word_count);
            if stats.speakers.is_empty() {
                println!("Speakers: none");
            } else {
                println!("Speakers: {}", stats.speakers.join(", "));
            }
        }
        Commands::Ping => {
            controller.test_connection().await?;
            info!("Service reachable at {}", controller.config().service.endpoint);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn report_edit(result: Option<PathBuf>) {
    match result {
        Some(path) => info!("Success: {:?}", path),
        None => warn!("Nothing changed"),
    }
}
