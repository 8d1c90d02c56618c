//! Platform-independent shell loop.
//!
//! This module contains the main loop, which interacts only through the
//! `IoHost` trait. The session's router is async; the core owns a
//! current-thread runtime and blocks on each command in turn.

use tokio::runtime::{Builder, Runtime};

use lockbox_router::MountTable;

use crate::commands::{self, CommandResult};
use crate::error::ReplError;
use crate::io::{ExitReason, IoError, IoHost, Output, PromptConfig, Signal};
use crate::session::Session;

/// The platform-independent shell core.
pub struct ReplCore {
    runtime: Runtime,
    session: Session,
}

impl ReplCore {
    /// Start a core, restoring `table` if given or mounting the defaults.
    pub fn bootstrap(table: Option<&MountTable>) -> Result<Self, ReplError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ReplError::Runtime)?;

        let session = runtime.block_on(async {
            match table {
                Some(table) => Session::from_table(table).await,
                None => Session::with_defaults().await,
            }
        })?;

        Ok(Self { runtime, session })
    }

    /// Run the loop, reading/writing through the provided I/O host.
    ///
    /// Returns the reason for exiting (user exit or EOF).
    pub fn run(&mut self, io: &mut impl IoHost) -> Result<ExitReason, IoError> {
        io.write_output(Output::banner(BANNER))?;

        loop {
            self.update_prompt(io)?;
            io.wait_for_input()?;

            if let Some(signal) = io.read_signal()? {
                match signal {
                    Signal::Eof => {
                        io.write_output(Output::info("Goodbye!"))?;
                        io.flush()?;
                        return Ok(ExitReason::Eof);
                    }
                    Signal::Interrupt => {
                        io.write_output(Output::info("^C (use 'exit' to quit)"))?;
                        continue;
                    }
                }
            }

            let input = match io.read_input()? {
                Some(input) => input,
                None => continue,
            };

            let result = self
                .runtime
                .block_on(commands::execute(&input.line, &self.session));

            match result {
                CommandResult::Ok { display: None } => {}
                CommandResult::Ok {
                    display: Some(output),
                } => {
                    io.write_output(Output::normal(output))?;
                }
                CommandResult::Error(msg) => {
                    io.write_output(Output::error(msg))?;
                }
                CommandResult::Help => {
                    io.write_output(Output::normal(commands::format_help()))?;
                }
                CommandResult::Exit => {
                    io.write_output(Output::info("Goodbye!"))?;
                    io.flush()?;
                    return Ok(ExitReason::UserExit);
                }
            }

            io.flush()?;
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn update_prompt(&self, io: &mut impl IoHost) -> Result<(), IoError> {
        let mounts = self.runtime.block_on(self.session.router().list_mounts());

        io.write_prompt(PromptConfig {
            mount_count: mounts.len(),
            tainted_count: mounts.iter().filter(|m| m.tainted).count(),
        })
    }
}

const BANNER: &str = r#"
 _            _    _
| | ___   ___| | _| |__   _____  __
| |/ _ \ / __| |/ / '_ \ / _ \ \/ /
| | (_) | (__|   <| |_) | (_) >  <
|_|\___/ \___|_|\_\_.__/ \___/_/\_\

Type 'help' for available commands, 'exit' to quit.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{OutputStyle, TestHost};
    use lockbox_router::MountEntry;

    fn core() -> ReplCore {
        ReplCore::bootstrap(None).unwrap()
    }

    #[test]
    fn test_exit_command() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_input("exit");

        let result = core.run(&mut host);

        assert!(matches!(result, Ok(ExitReason::UserExit)));
        assert!(host.output_text().contains("Goodbye"));
    }

    #[test]
    fn test_eof_signal() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_signal(Signal::Eof);

        let result = core.run(&mut host);

        assert!(matches!(result, Ok(ExitReason::Eof)));
    }

    #[test]
    fn test_interrupt_continues() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_signal(Signal::Interrupt);
        host.queue_input("exit");

        let result = core.run(&mut host);

        assert!(matches!(result, Ok(ExitReason::UserExit)));
        assert!(host.output_text().contains("^C"));
    }

    #[test]
    fn test_write_then_read() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_inputs([
            "write secret/db {\"password\": \"hunter2\"}",
            "read secret/db",
            "exit",
        ]);

        core.run(&mut host).unwrap();

        assert!(host.errors().is_empty());
        let output = host.output_plain();
        assert!(output.contains("\"password\": \"hunter2\""), "{}", output);
    }

    #[test]
    fn test_errors_use_error_style() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_inputs(["read nowhere/foo", "exit"]);

        core.run(&mut host).unwrap();

        assert_eq!(host.errors(), vec!["unsupported path"]);
    }

    #[test]
    fn test_prompt_tracks_mounts() {
        let mut core = core();
        let mut host = TestHost::new();
        host.queue_inputs(["mount prod/aws kv", "taint prod/aws", "exit"]);

        core.run(&mut host).unwrap();

        let prompt = host.last_prompt().unwrap();
        assert_eq!(prompt.mount_count, 2);
        assert_eq!(prompt.tainted_count, 1);
        assert_eq!(host.output_with_style(OutputStyle::Banner).len(), 1);
    }

    #[test]
    fn test_bootstrap_from_table() {
        let mut table = MountTable::new();
        table.add(MountEntry::new("team/", "kv"));

        let core = ReplCore::bootstrap(Some(&table)).unwrap();
        let mounts = core.runtime.block_on(core.session().router().list_mounts());

        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].path, "team/");
    }
}
