mod apply;
mod config;
mod event;
mod format;
mod keys;
mod labels;
mod options;
mod runloop;
mod source;

use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use signal_hook::consts::SIGINT;

use config::{Cli, Config};
use runloop::RunLoop;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::load(&cli);
    log::info!(
        "input-debug-events starting (backend={}, grab={})",
        config.backend,
        config.grab
    );

    let start_time = source::start_time(&config.backend)?;
    let mut source = source::open(&config)?;

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&stop))
        .map_err(|e| format!("Failed to set up signal handling ({})", e))?;

    let out: Box<dyn Write> = if config.quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };

    let mut run_loop = RunLoop::new(start_time, config.options, stop, out);
    run_loop.run(source.as_mut())?;

    log::debug!("Run loop state: {:?}", run_loop.state());
    Ok(())
}
