//! CLI surface: argument parsing and command dispatch for `csd`.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use classroom_signage::core::config::SignageConfig;
use classroom_signage::core::errors::Result;
use classroom_signage::engine::SignageEngine;
use classroom_signage::feed::json_dir::JsonDirStore;
use classroom_signage::logger::jsonl::JsonlConfig;
use classroom_signage::logger::spawn_logger;
use classroom_signage::signals::SignalHandler;
use classroom_signage::surface::console::{ConsoleSurface, TerminalBell};

/// Cadence at which the signal watcher polls for SIGTERM/SIGINT.
const SIGNAL_POLL: Duration = Duration::from_millis(200);

/// Classroom signage display.
#[derive(Debug, Parser)]
#[command(name = "csd", version, about)]
pub struct Cli {
    /// Explicit configuration file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the display against a store directory.
    Run {
        /// Override the configured store directory.
        #[arg(long)]
        store: Option<PathBuf>,
        /// Disable the activity log for this run.
        #[arg(long)]
        no_log: bool,
    },
    /// Load and validate the configuration, then print its hash.
    CheckConfig,
}

/// Dispatch the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let config = SignageConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::CheckConfig => {
            println!("config ok (hash {})", config.stable_hash()?);
            println!("store dir: {}", config.feed.store_dir.display());
            Ok(())
        }
        Command::Run { store, no_log } => run_display(config, store.clone(), *no_log),
    }
}

fn run_display(mut config: SignageConfig, store: Option<PathBuf>, no_log: bool) -> Result<()> {
    if let Some(dir) = store {
        config.feed.store_dir = dir;
    }

    let (logger, logger_join) = spawn_logger(JsonlConfig {
        path: (!no_log).then(|| config.paths.jsonl_log.clone()),
        ..JsonlConfig::default()
    })?;

    let store = JsonDirStore::new(&config.feed.store_dir, config.feed.poll_interval());
    eprintln!(
        "[CSD] watching store at {} (ctrl-c to stop)",
        store.dir().display()
    );

    let mut engine = SignageEngine::new(
        config,
        Box::new(ConsoleSurface::new()),
        Box::new(TerminalBell::new()),
        logger.clone(),
    );
    let handle = engine.handle();

    // Unattended terminal: prime audio up front, the way kiosk mode does.
    handle.gesture();

    // Signal watcher forwards SIGTERM/SIGINT into the event loop.
    let signals = SignalHandler::new();
    let watcher = {
        let handle = handle.clone();
        let signals = signals.clone();
        thread::Builder::new()
            .name("csd-signals".to_string())
            .spawn(move || {
                while !signals.should_shutdown() {
                    thread::sleep(SIGNAL_POLL);
                }
                handle.shutdown();
            })
            .map_err(|e| classroom_signage::core::errors::SignageError::Runtime {
                details: format!("failed to spawn signal watcher: {e}"),
            })?
    };

    let result = engine.run(&store);

    // Release the watcher if the loop ended for another reason.
    signals.request_shutdown();
    let _ = watcher.join();

    logger.shutdown();
    let _ = logger_join.join();
    result
}
