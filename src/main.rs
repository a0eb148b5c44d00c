mod cli;

use spindle3d::app::{Action, App};
use spindle3d::config;
use spindle3d::terminal::TerminalSurface;
use spindle3d::{Result, SpindleError};
use std::fs::File;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(args: &cli::Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let directive = format!("spindle3d={}", args.log_level);
    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .map_err(|e| SpindleError::InvalidArgument(format!("bad log level: {e}")))?,
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let args = cli::parse();
    init_logging(&args)?;

    let mut config = config::load(args.config.as_deref())?;
    if let Some(thickness) = args.thickness {
        config.geometry.thickness = thickness;
        config.validate()?;
    }
    info!(?config, "configuration resolved");

    let mut app = App::new(&config)?;
    if args.autostart {
        app.apply(Action::Invoke("start"));
    }

    let mut surface = TerminalSurface::enter()?;
    let result = app.run(&mut surface);
    drop(surface);

    result
}
