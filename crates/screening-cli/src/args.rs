use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Recorded landmark frames, one JSON object per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Result output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pace frames by their timestamps through the async runner
    #[arg(long, default_value_t = false)]
    pub realtime: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed result
    Json,
    /// Compact key=value; text
    Kv,
    /// Host message envelope
    Envelope,
}
