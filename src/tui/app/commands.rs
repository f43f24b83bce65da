pub const HELP_TEXT: &str = r"Available commands:
/help         - Show this help message
/clear        - Forget the conversation
/model [id]   - Show or switch the chat model
/listen       - Toggle voice input
/speak        - Toggle reading replies aloud
/exit         - Exit the application

Esc cancels a reply in progress.";

pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/help", "show available commands"),
    ("/clear", "forget the conversation"),
    ("/model", "show or switch the chat model"),
    ("/listen", "toggle voice input"),
    ("/speak", "toggle reading replies aloud"),
    ("/exit", "exit vexa"),
];

#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Exit,
    Clear,
    Model(Option<String>),
    Listen,
    Speak,
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        match cmd {
            "/help" => Self::Help,
            "/exit" | "/quit" => Self::Exit,
            "/clear" => Self::Clear,
            "/model" => Self::Model(parts.next().map(str::to_string)),
            "/listen" => Self::Listen,
            "/speak" => Self::Speak,
            _ => Self::Unknown(cmd.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_model_argument() {
        assert_eq!(SlashCommand::parse("/model"), SlashCommand::Model(None));
        assert_eq!(
            SlashCommand::parse("/model  gpt-4o "),
            SlashCommand::Model(Some("gpt-4o".to_string()))
        );
    }

    #[test]
    fn test_parses_known_commands() {
        assert_eq!(SlashCommand::parse("/help"), SlashCommand::Help);
        assert_eq!(SlashCommand::parse("/quit"), SlashCommand::Exit);
        assert_eq!(SlashCommand::parse("/listen"), SlashCommand::Listen);
        assert_eq!(SlashCommand::parse("/speak"), SlashCommand::Speak);
    }

    #[test]
    fn test_unknown_keeps_name() {
        assert_eq!(
            SlashCommand::parse("/save file"),
            SlashCommand::Unknown("/save".to_string())
        );
    }

    #[test]
    fn test_every_suggestion_parses() {
        for (cmd, _) in SLASH_COMMANDS {
            assert!(!matches!(SlashCommand::parse(cmd), SlashCommand::Unknown(_)));
        }
    }
}
