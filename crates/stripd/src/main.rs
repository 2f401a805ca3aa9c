//! stripd — UDP text-command controller for addressable LED strips.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;

/// Shared shutdown flag — cleared by the Ctrl+C / SIGTERM handler.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "stripd",
    version,
    about = "UDP text-command controller for addressable LED strips"
)]
struct Args {
    /// Output as JSON (for check, config)
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the daemon config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: cli::Command,
}

fn init_logging(verbose: bool, daemon: bool) {
    let default = if verbose {
        "debug"
    } else if daemon {
        "info"
    } else {
        "warn"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    builder.format_target(false);
    if !daemon {
        builder.format_timestamp(None);
    }
    builder.init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.command.is_daemon());

    if let Err(e) = ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    }) {
        log::warn!("could not install signal handler: {e}");
    }

    if let Err(e) = cli::run(args.command, args.json, args.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
