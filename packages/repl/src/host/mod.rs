//! Interactive hosts for the shell core.

pub mod terminal;

pub use terminal::TerminalHost;
