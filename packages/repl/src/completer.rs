use reedline::{Completer, Span, Suggestion};

use crate::commands::COMMANDS;

/// Completes command names at the start of the line.
#[derive(Debug, Default)]
pub struct ReplCompleter;

impl ReplCompleter {
    pub fn new() -> Self {
        Self
    }
}

impl Completer for ReplCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line_to_pos = &line[..pos];
        let prefix = line_to_pos.trim_start();

        // Only the first word is a command
        if prefix.contains(char::is_whitespace) {
            return Vec::new();
        }
        let start = pos - prefix.len();

        COMMANDS
            .iter()
            .filter(|(name, _, _)| !name.is_empty() && name.starts_with(prefix))
            .map(|&(name, _, description)| Suggestion {
                value: name.to_string(),
                description: Some(description.to_string()),
                style: None,
                extra: None,
                span: Span::new(start, pos),
                append_whitespace: true,
                match_indices: None,
            })
            .collect()
    }
}
