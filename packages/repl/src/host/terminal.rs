//! Terminal host backed by Reedline.
//!
//! Line editing (vi or emacs), tab completion, highlighting and a
//! persistent history file under the user's local data directory.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::PathBuf;

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultHinter, EditCommand, EditMode, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, PromptViMode, Reedline, ReedlineEvent, ReedlineMenu,
    Signal as ReedlineSignal, Vi,
};
use tracing::debug;

use crate::completer::ReplCompleter;
use crate::highlighter::ReplHighlighter;
use crate::io::{InputLine, IoError, IoHost, Output, OutputStyle, PromptConfig, Signal};

/// Environment variable forcing the editing mode (`vi` or `emacs`).
pub const EDIT_MODE_VAR: &str = "LOCKBOX_EDIT_MODE";

const HISTORY_SIZE: usize = 1000;
const COMPLETION_MENU: &str = "completion_menu";

/// Terminal host using Reedline for interactive I/O.
pub struct TerminalHost {
    line_editor: Reedline,
    pending_input: Option<InputLine>,
    pending_signal: Option<Signal>,
    current_prompt: PromptConfig,
}

impl TerminalHost {
    pub fn new() -> io::Result<Self> {
        let hinter =
            DefaultHinter::default().with_style(Style::new().fg(Color::LightGray).dimmed());
        let completion_menu = ColumnarMenu::default()
            .with_name(COMPLETION_MENU)
            .with_text_style(Style::new().fg(Color::Cyan))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan).bold());

        let mut line_editor = Reedline::create()
            .with_completer(Box::new(ReplCompleter::new()))
            .with_highlighter(Box::new(ReplHighlighter::new()))
            .with_hinter(Box::new(hinter))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(completion_menu)))
            .with_edit_mode(edit_mode());

        if let Some(path) = history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_SIZE, path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => debug!(error = %e, "history disabled"),
            }
        }

        Ok(Self {
            line_editor,
            pending_input: None,
            pending_signal: None,
            current_prompt: PromptConfig::default(),
        })
    }
}

impl IoHost for TerminalHost {
    fn wait_for_input(&mut self) -> Result<(), IoError> {
        let prompt = TerminalPrompt(self.current_prompt.clone());

        match self.line_editor.read_line(&prompt) {
            Ok(ReedlineSignal::Success(line)) => self.pending_input = Some(InputLine { line }),
            Ok(ReedlineSignal::CtrlC) => self.pending_signal = Some(Signal::Interrupt),
            Ok(ReedlineSignal::CtrlD) => self.pending_signal = Some(Signal::Eof),
            Err(e) => return Err(IoError::Io(format!("Reedline error: {}", e))),
        }

        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
        Ok(self.pending_input.take())
    }

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
        Ok(self.pending_signal.take())
    }

    fn write_output(&mut self, output: Output) -> Result<(), IoError> {
        let styled = match output.style {
            OutputStyle::Normal => output.text,
            OutputStyle::Error => format!("{} {}", Color::Red.bold().paint("Error:"), output.text),
            OutputStyle::Info | OutputStyle::Banner => Color::Cyan.paint(&output.text).to_string(),
        };
        println!("{}", styled);
        Ok(())
    }

    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError> {
        self.current_prompt = config;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IoError> {
        io::stdout().flush().map_err(|e| IoError::Io(e.to_string()))
    }
}

struct TerminalPrompt(PromptConfig);

impl Prompt for TerminalPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let mut left = format!(
            "{} {}",
            Color::Magenta.bold().paint("lockbox"),
            Color::Blue.paint(format!("[{} mounts]", self.0.mount_count))
        );
        if self.0.tainted_count > 0 {
            left.push_str(&format!(
                " {}",
                Color::Red.paint(format!("[{} tainted]", self.0.tainted_count))
            ));
        }
        Cow::Owned(left)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        let indicator = match edit_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Color::Blue.bold().paint("[N]>"),
            PromptEditMode::Vi(PromptViMode::Insert) => Color::Green.bold().paint("[I]>"),
            PromptEditMode::Custom(s) => return Cow::Owned(format!("({})> ", s)),
            _ => Color::Green.bold().paint(">"),
        };
        Cow::Owned(format!(" {} ", indicator))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}reverse-search: {}) ", prefix, history_search.term))
    }
}

fn with_tab_completion(mut keybindings: Keybindings) -> Keybindings {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings
}

fn edit_mode() -> Box<dyn EditMode> {
    if use_vi_mode() {
        Box::new(Vi::new(
            with_tab_completion(default_vi_insert_keybindings()),
            default_vi_normal_keybindings(),
        ))
    } else {
        let mut keybindings = with_tab_completion(default_emacs_keybindings());
        keybindings.add_binding(
            KeyModifiers::CONTROL,
            KeyCode::Char('d'),
            ReedlineEvent::Edit(vec![EditCommand::Clear]),
        );
        Box::new(Emacs::new(keybindings))
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("lockbox").join("history.txt"))
}

/// Vi mode when forced via `LOCKBOX_EDIT_MODE`, otherwise when the user's
/// editor or inputrc asks for it.
fn use_vi_mode() -> bool {
    if let Ok(mode) = std::env::var(EDIT_MODE_VAR) {
        return is_vi(&mode);
    }

    ["EDITOR", "VISUAL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .any(|editor| is_vi(&editor))
        || inputrc_wants_vi()
}

fn is_vi(name: &str) -> bool {
    let name = name.to_lowercase();
    name == "vi" || name.contains("vim")
}

fn inputrc_wants_vi() -> bool {
    let candidates = [
        std::env::var("INPUTRC").ok().map(PathBuf::from),
        dirs::home_dir().map(|p| p.join(".inputrc")),
        Some(PathBuf::from("/etc/inputrc")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .any(|content| {
            content.lines().map(str::trim).any(|line| {
                line.starts_with("set") && line.contains("editing-mode") && line.ends_with("vi")
            })
        })
}
