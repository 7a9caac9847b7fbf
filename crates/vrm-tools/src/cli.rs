use std::path::PathBuf;

use clap::ValueHint;
use vrm_io::Language;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Full => f.write_str("full"),
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Language of license confirmation messages.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum MessageLanguage {
    En,
    Ja,
}

impl std::fmt::Display for MessageLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageLanguage::En => f.write_str("en"),
            MessageLanguage::Ja => f.write_str("ja"),
        }
    }
}

impl From<MessageLanguage> for Language {
    fn from(language: MessageLanguage) -> Self {
        match language {
            MessageLanguage::En => Language::English,
            MessageLanguage::Ja => Language::Japanese,
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        global = true,
        default_value = "warn,vrm_io=info",
        env = "VRM_INSPECT_LOG"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Import a VRM file and print what it contains
    Inspect {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Import even if the license metadata needs confirmation
        #[arg(long)]
        skip_license_check: bool,
        /// Keep UVs exactly as stored, even from legacy exporters
        #[arg(long)]
        no_legacy_uv_fix: bool,
        /// Language of license messages
        #[arg(long, default_value_t = MessageLanguage::En, env = "VRM_INSPECT_LANGUAGE")]
        language: MessageLanguage,
        /// Print the whole document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate only the license metadata of a VRM file
    License {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Language of license messages
        #[arg(long, default_value_t = MessageLanguage::En, env = "VRM_INSPECT_LANGUAGE")]
        language: MessageLanguage,
    },
    /// Compare two VRM files after decoding their accessors
    Diff {
        #[arg(value_hint = ValueHint::FilePath)]
        left: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        right: PathBuf,
        /// Absolute tolerance for float comparisons
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,
    },
    /// Strip characters that are unsafe in file names
    Sanitize { name: String },
}

/// Set up log output on stderr
pub(crate) fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
    let tsub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(log_filter);

    match log_format {
        LogFormat::Compact => tsub.compact().init(),
        LogFormat::Full => tsub.init(),
        LogFormat::Pretty => tsub.pretty().init(),
        LogFormat::Json => tsub.json().init(),
    }
}
