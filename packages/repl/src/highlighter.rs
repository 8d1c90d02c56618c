use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::commands::COMMANDS;

const ALIASES: &[&str] = &[
    "get", "r", "set", "w", "rm", "ls", "umount", "mv", "quit", "q", "?",
];

/// Colours the command, its path and any JSON body.
#[derive(Debug, Default)]
pub struct ReplHighlighter;

impl ReplHighlighter {
    pub fn new() -> Self {
        Self
    }
}

fn is_command(word: &str) -> bool {
    COMMANDS.iter().any(|(name, _, _)| !name.is_empty() && *name == word) || ALIASES.contains(&word)
}

impl Highlighter for ReplHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        if line.is_empty() {
            return styled;
        }

        let (command, rest) = match line.find(char::is_whitespace) {
            Some(pos) => (&line[..pos], &line[pos..]),
            None => (line, ""),
        };

        let cmd_lower = command.to_lowercase();
        let cmd_style = if is_command(&cmd_lower) {
            Style::new().bold().fg(Color::Cyan)
        } else {
            Style::new().fg(Color::Red)
        };
        styled.push((cmd_style, command.to_string()));

        if rest.is_empty() {
            return styled;
        }

        let path_style = Style::new().fg(Color::Yellow);
        match (cmd_lower.as_str(), rest.find('{')) {
            ("write" | "set" | "w", Some(json_pos)) => {
                styled.push((path_style, rest[..json_pos].to_string()));
                styled.push((Style::new().fg(Color::Green), rest[json_pos..].to_string()));
            }
            ("help" | "?" | "exit" | "quit" | "q" | "mounts", _) => {
                styled.push((Style::new(), rest.to_string()));
            }
            _ => styled.push((path_style, rest.to_string())),
        }

        styled
    }
}
