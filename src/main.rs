use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use midclick::common;

/// Rewrites a left-click performed with three fingers on the trackpad into a
/// middle-click. Runs until killed.
#[derive(Parser)]
#[command(name = "midclick", version, about)]
struct Cli {
    /// Default log filter, e.g. "debug" or "midclick=trace". `RUST_LOG`
    /// takes precedence when set.
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    common::log::init(&cli.log);
    run()
}

#[cfg(target_os = "macos")]
fn run() -> ExitCode {
    match midclick::daemon::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn run() -> ExitCode {
    error!("midclick relies on macOS multitouch and event tap APIs; this platform is unsupported");
    ExitCode::FAILURE
}
