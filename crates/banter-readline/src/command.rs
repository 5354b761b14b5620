//! Parsing of REPL input lines into shell commands.

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &["/new", "/theme", "/history", "/html", "/help", "/quit"];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Start a new chat.
    New,
    /// Show or switch the theme.
    Theme(Option<String>),
    History,
    Html,
    Help,
    Quit,
    Unknown(String),
    /// Anything that is not a slash command goes to the model as-is.
    Prompt(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return ShellCommand::Prompt(line.to_string());
        }

        let (name, argument) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|rest| !rest.is_empty())),
            None => (trimmed, None),
        };

        match name {
            "/new" => ShellCommand::New,
            "/theme" => ShellCommand::Theme(argument.map(str::to_string)),
            "/history" => ShellCommand::History,
            "/html" => ShellCommand::Html,
            "/help" => ShellCommand::Help,
            "/quit" | "/exit" => ShellCommand::Quit,
            other => ShellCommand::Unknown(other.to_string()),
        }
    }
}
