use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lockbox_repl::host::terminal::EDIT_MODE_VAR;

/// Environment variable holding the log filter.
const LOG_VAR: &str = "LOCKBOX_LOG";

/// Lockbox - interactive shell over a secrets router
#[derive(Parser, Debug)]
#[command(name = "lockbox")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON mount table to restore at startup
    #[arg(long, value_name = "FILE")]
    mounts: Option<PathBuf>,

    /// Force vi editing mode
    #[arg(long, conflicts_with = "emacs")]
    vi: bool,

    /// Force emacs editing mode
    #[arg(long)]
    emacs: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with command output
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.vi {
        std::env::set_var(EDIT_MODE_VAR, "vi");
    } else if args.emacs {
        std::env::set_var(EDIT_MODE_VAR, "emacs");
    }

    let table = match args.mounts.as_deref().map(lockbox_repl::load_mount_table) {
        Some(Ok(table)) => Some(table),
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        None => None,
    };

    match lockbox_repl::run(table.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
