//! The boundary between the shell core and whatever drives it.
//!
//! The core only talks to an `IoHost`: the terminal host in `host` for
//! interactive use, `TestHost` for driving whole sessions from tests.

/// A line typed by the user.
#[derive(Debug, Clone)]
pub struct InputLine {
    pub line: String,
}

/// Out-of-band input from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    Eof,
}

/// How the host should present an `Output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// Printed as-is; may already carry ANSI codes.
    #[default]
    Normal,
    Error,
    Info,
    Banner,
}

/// A block of text for the user.
#[derive(Debug, Clone)]
pub struct Output {
    pub text: String,
    pub style: OutputStyle,
}

impl Output {
    fn styled(text: impl Into<String>, style: OutputStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Normal)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Error)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Info)
    }

    pub fn banner(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Banner)
    }
}

/// State shown in the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptConfig {
    pub mount_count: usize,
    pub tainted_count: usize,
}

/// Why the loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// `exit` or `quit`
    UserExit,
    /// Ctrl+D
    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(String),
}

/// Host-side I/O used by the shell core.
///
/// After `wait_for_input` returns, either `read_signal` or `read_input`
/// yields something; the core checks signals first.
pub trait IoHost {
    /// Block until the user has typed a line or sent a signal.
    fn wait_for_input(&mut self) -> Result<(), IoError>;

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError>;

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError>;

    fn write_output(&mut self, output: Output) -> Result<(), IoError>;

    /// Store the prompt state to render before the next input.
    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError>;

    fn flush(&mut self) -> Result<(), IoError> {
        Ok(())
    }
}

#[cfg(test)]
pub use test_host::{strip_ansi, TestHost};

#[cfg(test)]
mod test_host {
    use std::collections::VecDeque;

    use super::*;

    /// Drop ANSI escapes so assertions can look at plain text.
    pub fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for next in chars.by_ref() {
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Scripted host: queued lines and signals in, buffered output out.
    #[derive(Debug, Default)]
    pub struct TestHost {
        inputs: VecDeque<String>,
        signals: VecDeque<Signal>,
        outputs: Vec<Output>,
        last_prompt: Option<PromptConfig>,
    }

    impl TestHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue_input(&mut self, line: impl Into<String>) {
            self.inputs.push_back(line.into());
        }

        pub fn queue_inputs(&mut self, lines: impl IntoIterator<Item = impl Into<String>>) {
            for line in lines {
                self.queue_input(line);
            }
        }

        pub fn queue_signal(&mut self, signal: Signal) {
            self.signals.push_back(signal);
        }

        /// All output text, concatenated.
        pub fn output_text(&self) -> String {
            self.outputs.iter().map(|o| o.text.as_str()).collect()
        }

        /// All output text with styling removed.
        pub fn output_plain(&self) -> String {
            strip_ansi(&self.output_text())
        }

        pub fn output_with_style(&self, style: OutputStyle) -> Vec<&str> {
            self.outputs
                .iter()
                .filter(|o| o.style == style)
                .map(|o| o.text.as_str())
                .collect()
        }

        pub fn errors(&self) -> Vec<&str> {
            self.output_with_style(OutputStyle::Error)
        }

        pub fn last_prompt(&self) -> Option<&PromptConfig> {
            self.last_prompt.as_ref()
        }
    }

    impl IoHost for TestHost {
        fn wait_for_input(&mut self) -> Result<(), IoError> {
            Ok(())
        }

        fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
            Ok(self.inputs.pop_front().map(|line| InputLine { line }))
        }

        fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
            Ok(self.signals.pop_front())
        }

        fn write_output(&mut self, output: Output) -> Result<(), IoError> {
            self.outputs.push(output);
            Ok(())
        }

        fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError> {
            self.last_prompt = Some(config);
            Ok(())
        }
    }

    #[test]
    fn inputs_and_signals_come_back_in_order() {
        let mut host = TestHost::new();
        host.queue_inputs(["first", "second"]);
        host.queue_signal(Signal::Interrupt);

        assert_eq!(host.read_signal().unwrap(), Some(Signal::Interrupt));
        assert_eq!(host.read_signal().unwrap(), None);
        assert_eq!(host.read_input().unwrap().unwrap().line, "first");
        assert_eq!(host.read_input().unwrap().unwrap().line, "second");
        assert!(host.read_input().unwrap().is_none());
    }

    #[test]
    fn outputs_filter_by_style() {
        let mut host = TestHost::new();
        host.write_output(Output::normal("ok\n")).unwrap();
        host.write_output(Output::error("boom")).unwrap();

        assert_eq!(host.output_text(), "ok\nboom");
        assert_eq!(host.errors(), vec!["boom"]);
    }
}
