use crate::player::BackendKind;
use crate::watcher::WatcherKind;
use clap::Parser;
use std::path::PathBuf;

/// soundgrid - A live-reloading WAV soundboard for your terminal 🔊
#[derive(Parser, Debug, Default)]
#[command(name = "soundgrid", version, about)]
pub struct Args {
    /// Directory to scan for .wav clips (default: current directory)
    #[arg(long, short = 'r')]
    pub root: Option<PathBuf>,

    /// How to notice changes under the root
    #[arg(long, value_enum)]
    pub watcher: Option<WatcherKind>,

    /// Polling interval for the poll watcher, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Where to play clips
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Read this config file instead of ~/.config/soundgrid/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print discovered clips with their durations and exit
    #[arg(long, short = 'l')]
    pub list: bool,

    /// Generate default config.toml to stdout
    #[arg(long)]
    pub generate_config: bool,
}
