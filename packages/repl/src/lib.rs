//! # lockbox-repl
//!
//! An interactive shell over an in-process lockbox router.
//!
//! Every command goes through the same `Router` API a server would use, so
//! the shell is a convenient way to poke at mount and routing behavior.
//!
//! ## Usage
//!
//! ```bash
//! # Start with a kv engine at secret/
//! lockbox
//!
//! # Restore mounts from a saved table
//! lockbox --mounts mounts.json
//!
//! # Inside the shell:
//! > write secret/db {"password": "hunter2"}
//! > read secret/db wrap=60
//! > mount prod/aws kv
//! > taint prod/aws
//! > rollback prod/aws/creds
//! ```

pub mod commands;
pub mod completer;
pub mod error;
pub mod highlighter;
pub mod host;
pub mod io;
pub mod session;
pub mod shell;

use lockbox_router::MountTable;

pub use error::ReplError;
pub use session::{load_mount_table, Session};
pub use shell::ReplCore;

/// Run the shell in the terminal until the user exits.
pub fn run(table: Option<&MountTable>) -> Result<(), ReplError> {
    let mut core = ReplCore::bootstrap(table)?;
    let mut host = host::TerminalHost::new().map_err(|e| io::IoError::Io(e.to_string()))?;
    core.run(&mut host)?;
    Ok(())
}
