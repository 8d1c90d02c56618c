//! Shell command parsing and execution.
//!
//! Commands:
//! - `mount <path> <type>` / `unmount <path>` / `remount <from> <to>`
//! - `taint <path>` / `untaint <path>` / `mounts`
//! - `read <path> [wrap=<secs>]` / `write <path> <json>` / `delete <path>`
//! - `list <path>` / `rollback <path>` / `revoke <path>` / `exists <path>`
//! - `root? <path>` / `login? <path>`
//! - `help` / `exit`
//!
//! Every request command builds a `Request` and routes it through the
//! session's `Router`, so the shell sees exactly what a library caller sees.

use std::time::Duration;

use lockbox_logical::{Operation, Request, Response};
use nu_ansi_term::{Color, Style};
use serde_json::{Map, Value as JsonValue};

use crate::session::Session;

/// Every command as `(name, arguments, description)`; empty rows separate groups.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("mount", "<path> <type>", "Mount a backend (types: kv, generic)"),
    ("unmount", "<path>", "Remove a mount and clean up its backend"),
    ("remount", "<from> <to>", "Move a mount to a new path"),
    ("taint", "<path>", "Only allow rollback and revoke on a mount"),
    ("untaint", "<path>", "Allow all traffic to a mount again"),
    ("mounts", "", "List current mounts"),
    ("", "", ""),
    ("read", "<path> [wrap=<secs>]", "Read a secret (alias: get, r)"),
    ("write", "<path> <json>", "Write a JSON object (alias: set, w)"),
    ("delete", "<path>", "Delete a secret (alias: rm)"),
    ("list", "<path>", "List keys under a path (alias: ls)"),
    ("rollback", "<path>", "Send a rollback request"),
    ("revoke", "<path>", "Send a revoke request"),
    ("exists", "<path>", "Run an existence check"),
    ("root?", "<path>", "Does the path require root?"),
    ("login?", "<path>", "Is the path reachable without a token?"),
    ("", "", ""),
    ("help", "", "Show this help message"),
    ("exit", "", "Exit the shell (alias: quit, q)"),
];

/// Result of executing a command
pub enum CommandResult {
    /// Command succeeded, optionally with output to display
    Ok { display: Option<String> },
    /// Command failed with an error message
    Error(String),
    /// User requested to exit
    Exit,
    /// Show help
    Help,
}

impl CommandResult {
    fn ok_display(display: impl Into<String>) -> Self {
        CommandResult::Ok {
            display: Some(display.into()),
        }
    }

    fn ok_none() -> Self {
        CommandResult::Ok { display: None }
    }

    fn ok() -> Self {
        Self::ok_display(Color::Green.paint("ok").to_string())
    }

    fn error(err: impl std::fmt::Display) -> Self {
        CommandResult::Error(err.to_string())
    }
}

/// Parse and execute a command
pub async fn execute(input: &str, session: &Session) -> CommandResult {
    let input = input.trim();

    if input.is_empty() {
        return CommandResult::ok_none();
    }

    let (cmd, args) = match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim()),
        None => (input, ""),
    };

    match cmd.to_lowercase().as_str() {
        "help" | "?" => CommandResult::Help,
        "exit" | "quit" | "q" => CommandResult::Exit,
        "mount" => cmd_mount(args, session).await,
        "unmount" | "umount" => cmd_unmount(args, session).await,
        "remount" | "mv" => cmd_remount(args, session).await,
        "taint" => cmd_taint(args, session, true).await,
        "untaint" => cmd_taint(args, session, false).await,
        "mounts" => cmd_mounts(session).await,
        "read" | "get" | "r" => cmd_read(args, session).await,
        "write" | "set" | "w" => cmd_write(args, session).await,
        "delete" | "rm" => cmd_route(Operation::Delete, args, session).await,
        "list" | "ls" => cmd_route(Operation::List, args, session).await,
        "rollback" => cmd_route(Operation::Rollback, args, session).await,
        "revoke" => cmd_route(Operation::Revoke, args, session).await,
        "exists" => cmd_exists(args, session).await,
        "root?" => cmd_classify(args, session, PathClass::Root).await,
        "login?" => cmd_classify(args, session, PathClass::Login).await,
        _ => CommandResult::Error(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            cmd
        )),
    }
}

/// Format help text
pub fn format_help() -> String {
    let cmd_style = Style::new().bold().fg(Color::Cyan);
    let arg_style = Style::new().fg(Color::Yellow);
    let desc_style = Style::new().fg(Color::White);

    let mut help = String::new();
    help.push_str(&format!(
        "{}\n\n",
        Style::new().bold().paint("Lockbox Commands")
    ));

    for &(cmd, args, desc) in COMMANDS {
        if cmd.is_empty() {
            help.push('\n');
        } else {
            help.push_str(&format!(
                "  {:<12} {:<22} {}\n",
                cmd_style.paint(cmd),
                arg_style.paint(args),
                desc_style.paint(desc)
            ));
        }
    }

    help.push_str(&format!("\n{}\n", Style::new().bold().paint("Examples")));
    help.push_str(&format!(
        "  {}\n",
        arg_style.paint("write secret/db {\"password\": \"hunter2\"}")
    ));
    help.push_str(&format!("  {}\n", arg_style.paint("read secret/db wrap=60")));
    help.push_str(&format!("  {}\n", arg_style.paint("mount prod/aws kv")));

    help
}

async fn cmd_mount(args: &str, session: &Session) -> CommandResult {
    let Some((path, kind)) = two_args(args) else {
        return CommandResult::Error("Usage: mount <path> <type>".to_string());
    };

    match session.mount(path, kind).await {
        Ok(entry) => CommandResult::ok_display(format!(
            "{} {} {} {}",
            Color::Green.paint("ok"),
            Color::Cyan.paint(&entry.kind),
            Color::DarkGray.paint("at"),
            Color::Magenta.paint(&entry.path)
        )),
        Err(e) => CommandResult::error(e),
    }
}

async fn cmd_unmount(args: &str, session: &Session) -> CommandResult {
    let Some(path) = one_arg(args) else {
        return CommandResult::Error("Usage: unmount <path>".to_string());
    };

    match session.router().unmount(path).await {
        Ok(()) => CommandResult::ok(),
        Err(e) => CommandResult::error(e),
    }
}

async fn cmd_remount(args: &str, session: &Session) -> CommandResult {
    let Some((from, to)) = two_args(args) else {
        return CommandResult::Error("Usage: remount <from> <to>".to_string());
    };

    match session.router().remount(from, to).await {
        Ok(()) => CommandResult::ok(),
        Err(e) => CommandResult::error(e),
    }
}

async fn cmd_taint(args: &str, session: &Session, tainted: bool) -> CommandResult {
    let Some(path) = one_arg(args) else {
        let name = if tainted { "taint" } else { "untaint" };
        return CommandResult::Error(format!("Usage: {} <path>", name));
    };

    let result = if tainted {
        session.router().taint(path).await
    } else {
        session.router().untaint(path).await
    };

    match result {
        Ok(()) => CommandResult::ok(),
        Err(e) => CommandResult::error(e),
    }
}

async fn cmd_mounts(session: &Session) -> CommandResult {
    let mounts = session.router().list_mounts().await;
    if mounts.is_empty() {
        return CommandResult::ok_display(
            Color::Yellow
                .paint("No mounts. Use 'mount <path> <type>' to add one.")
                .to_string(),
        );
    }

    let mut output = String::new();
    for mount in &mounts {
        output.push_str(&format!(
            "  {:<24} {:<8} {}",
            Color::Cyan.paint(&mount.path),
            mount.kind,
            Color::DarkGray.paint(&mount.uuid)
        ));
        if mount.tainted {
            output.push_str(&format!(" {}", Color::Red.paint("tainted")));
        }
        if !mount.description.is_empty() {
            output.push_str(&format!(" {}", Color::DarkGray.paint(&mount.description)));
        }
        output.push('\n');
    }
    CommandResult::ok_display(output.trim_end())
}

async fn cmd_read(args: &str, session: &Session) -> CommandResult {
    let mut words = args.split_whitespace();
    let Some(path) = words.next() else {
        return CommandResult::Error("Usage: read <path> [wrap=<secs>]".to_string());
    };

    let mut req = Request::new(Operation::Read, path);
    for word in words {
        match parse_wrap(word) {
            Some(ttl) => req.wrap_ttl = ttl,
            None => return CommandResult::Error(format!("Unexpected argument: {}", word)),
        }
    }

    route(req, session).await
}

async fn cmd_write(args: &str, session: &Session) -> CommandResult {
    let Some((path, json_str)) = parse_write_args(args) else {
        return CommandResult::Error("Usage: write <path> <json>".to_string());
    };

    let data: Map<String, JsonValue> = match serde_json::from_str(json_str) {
        Ok(data) => data,
        Err(e) => return CommandResult::Error(format!("Invalid JSON object: {}", e)),
    };

    route(Request::new(Operation::Update, path).with_data(data), session).await
}

async fn cmd_route(op: Operation, args: &str, session: &Session) -> CommandResult {
    let Some(path) = one_arg(args) else {
        return CommandResult::Error(format!("Usage: {} <path>", op));
    };

    route(Request::new(op, path), session).await
}

async fn cmd_exists(args: &str, session: &Session) -> CommandResult {
    let Some(path) = one_arg(args) else {
        return CommandResult::Error("Usage: exists <path>".to_string());
    };

    let mut req = Request::new(Operation::Read, path);
    match session.router().route_existence_check(&mut req).await {
        Ok((exists, handled)) => CommandResult::ok_display(format!(
            "{} {}  {} {}",
            Color::Cyan.paint("exists:"),
            format_bool(exists),
            Color::Cyan.paint("handled:"),
            format_bool(handled)
        )),
        Err(e) => CommandResult::error(e),
    }
}

enum PathClass {
    Root,
    Login,
}

async fn cmd_classify(args: &str, session: &Session, class: PathClass) -> CommandResult {
    let Some(path) = one_arg(args) else {
        return CommandResult::Error("Usage: root? <path> | login? <path>".to_string());
    };

    let matched = match class {
        PathClass::Root => session.router().root_path(path).await,
        PathClass::Login => session.router().login_path(path).await,
    };
    CommandResult::ok_display(format_bool(matched))
}

/// Route a request and render whatever came back.
async fn route(mut req: Request, session: &Session) -> CommandResult {
    match session.router().route(&mut req).await {
        Ok(Some(resp)) => CommandResult::ok_display(format_response(&resp)),
        Ok(None) if req.operation == Operation::Read => CommandResult::ok_display(
            Color::Yellow
                .paint("null (path does not exist)")
                .to_string(),
        ),
        Ok(None) => CommandResult::ok(),
        Err(e) => CommandResult::error(e),
    }
}

fn one_arg(args: &str) -> Option<&str> {
    let mut words = args.split_whitespace();
    let first = words.next()?;
    words.next().is_none().then_some(first)
}

fn two_args(args: &str) -> Option<(&str, &str)> {
    let mut words = args.split_whitespace();
    let first = words.next()?;
    let second = words.next()?;
    words.next().is_none().then_some((first, second))
}

/// Parse `wrap=<secs>`.
fn parse_wrap(word: &str) -> Option<Duration> {
    let secs = word.strip_prefix("wrap=")?;
    secs.parse().ok().map(Duration::from_secs)
}

/// Split `write` arguments into the path and the JSON body.
///
/// The body starts at the first `{`; paths never contain one.
fn parse_write_args(args: &str) -> Option<(&str, &str)> {
    let args = args.trim();
    let value_start = args.find('{')?;

    let path = args[..value_start].trim();
    let value = args[value_start..].trim();
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }

    Some((path, value))
}

fn format_bool(value: bool) -> String {
    if value {
        Color::Green.paint("true").to_string()
    } else {
        Color::Yellow.paint("false").to_string()
    }
}

fn format_response(resp: &Response) -> String {
    let mut out = format_json(&JsonValue::Object(resp.data.clone()));
    if let Some(wrap) = &resp.wrap_info {
        out.push_str(&format!(
            "\n{} {}s",
            Color::Magenta.paint("wrapped, ttl"),
            wrap.ttl.as_secs()
        ));
    }
    for warning in &resp.warnings {
        out.push_str(&format!("\n{} {}", Color::Yellow.paint("warning:"), warning));
    }
    out
}

/// Format JSON with syntax highlighting
fn format_json(value: &JsonValue) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

    let mut result = String::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in pretty.chars() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push_str(&Color::Green.paint("\"").to_string());
            continue;
        }

        if in_string {
            result.push_str(&Color::Green.paint(c.to_string()).to_string());
        } else {
            match c {
                '{' | '}' | '[' | ']' => {
                    result.push_str(&Color::White.bold().paint(c.to_string()).to_string())
                }
                _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                    result.push_str(&Color::Cyan.paint(c.to_string()).to_string())
                }
                _ => result.push(c),
            }
        }
    }

    result
}
