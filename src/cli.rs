use clap::Parser;
use std::path::PathBuf;

/// Rotating 3D spindle disc in the terminal.
#[derive(Parser, Debug)]
#[command(name = "spindle3d", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial disc thickness (overrides the config file).
    #[arg(short, long)]
    pub thickness: Option<f64>,

    /// Issue "start" as soon as the view is up.
    #[arg(long)]
    pub autostart: bool,

    /// Write logs to this file; the terminal itself is used for rendering.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn parse() -> Args {
    Args::parse()
}
