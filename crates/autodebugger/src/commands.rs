use std::path::PathBuf;

use forge_backend::Language;

use crate::app::{Action, Tab};

/// Line that ends a `/edit` block.
pub const EDIT_TERMINATOR: &str = ".";

pub const HELP_TEXT: &str = "\
### Commands

- `/run` executes the buffer in the sandbox
- `/debug` asks the auto-debugger for a fix
- `/apply` accepts the proposed fix, `/reject` keeps your code
- `/lang <python|javascript|cpp|java>` switches language and clears the buffer
- `/tab <output|diagnosis>` switches the bottom panel
- `/edit` replaces the buffer; end input with a line holding a single `.`
- `/load <path>` and `/save <path>` read or write the buffer
- `/sample` loads the binary search demo
- `/show` redraws the screen, `/help` shows this list, `/quit` exits";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Run,
    Debug,
    Apply,
    Reject,
    Language(Language),
    Tab(Tab),
    Edit,
    Load(PathBuf),
    Save(PathBuf),
    Sample,
    Show,
    Help,
    Quit,
    /// A known command with a bad or missing argument.
    Invalid(String),
    Unknown(String),
}

/// Parses one input line. Lines that do not start with `/` are not commands.
pub fn parse_console_command(input: &str) -> Option<ConsoleCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/run" => ConsoleCommand::Run,
        "/debug" => ConsoleCommand::Debug,
        "/apply" => ConsoleCommand::Apply,
        "/reject" => ConsoleCommand::Reject,
        "/lang" | "/language" => match argument {
            "" => ConsoleCommand::Invalid(
                "Usage: /lang <python|javascript|cpp|java>".to_string(),
            ),
            id => id
                .parse::<Language>()
                .map_or_else(ConsoleCommand::Invalid, ConsoleCommand::Language),
        },
        "/tab" => match argument {
            "" => ConsoleCommand::Invalid("Usage: /tab <output|diagnosis>".to_string()),
            name => name
                .parse::<Tab>()
                .map_or_else(ConsoleCommand::Invalid, ConsoleCommand::Tab),
        },
        "/edit" => ConsoleCommand::Edit,
        "/load" => path_argument(argument, "/load")
            .map_or_else(ConsoleCommand::Invalid, ConsoleCommand::Load),
        "/save" => path_argument(argument, "/save")
            .map_or_else(ConsoleCommand::Invalid, ConsoleCommand::Save),
        "/sample" => ConsoleCommand::Sample,
        "/show" => ConsoleCommand::Show,
        "/help" => ConsoleCommand::Help,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

impl ConsoleCommand {
    /// The session action this command maps to, for commands that map to one directly.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::Run => Some(Action::Run),
            Self::Debug => Some(Action::Debug),
            Self::Apply => Some(Action::ApplyFix),
            Self::Reject => Some(Action::RejectFix),
            Self::Language(language) => Some(Action::SetLanguage(*language)),
            Self::Tab(tab) => Some(Action::SetActiveTab(*tab)),
            Self::Quit => Some(Action::Quit),
            Self::Edit
            | Self::Load(_)
            | Self::Save(_)
            | Self::Sample
            | Self::Show
            | Self::Help
            | Self::Invalid(_)
            | Self::Unknown(_) => None,
        }
    }
}

fn path_argument(argument: &str, command: &str) -> Result<PathBuf, String> {
    if argument.is_empty() {
        Err(format!("Usage: {command} <path>"))
    } else {
        Ok(PathBuf::from(argument))
    }
}

/// Accumulates `/edit` input until the terminator line.
///
/// A line of `..` stands for a literal `.` line in the buffer.
#[derive(Debug, Default)]
pub struct EditCollector {
    lines: Vec<String>,
}

impl EditCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one input line; returns the finished buffer on the terminator.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == EDIT_TERMINATOR {
            let mut text = std::mem::take(&mut self.lines).join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            return Some(text);
        }

        if line == ".." {
            self.lines.push(EDIT_TERMINATOR.to_string());
        } else {
            self.lines.push(line.to_string());
        }
        None
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_console_command("print(1)"), None);
        assert_eq!(parse_console_command("  "), None);
    }

    #[test]
    fn edit_collector_stops_at_terminator() {
        let mut collector = EditCollector::new();
        assert_eq!(collector.push_line("x = 1\n"), None);
        assert_eq!(collector.push_line(".."), None);
        assert_eq!(collector.line_count(), 2);
        assert_eq!(collector.push_line(".\r\n"), Some("x = 1\n.\n".to_string()));
        assert_eq!(collector.line_count(), 0);
    }

    #[test]
    fn empty_edit_block_yields_empty_buffer() {
        assert_eq!(EditCollector::new().push_line("."), Some(String::new()));
    }
}
