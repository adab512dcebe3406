use inquire::autocompletion::{Autocomplete, Replacement};

/// Available slash commands: (command, description), in help order.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help message"),
    ("/config", "Show current model configuration"),
    ("/history", "Show conversation history"),
    ("/clear", "Clear conversation history"),
    ("/stats", "Show conversation statistics"),
    ("/export", "Export conversation to file"),
    ("/save", "Save current configuration"),
    ("/load", "Load saved configuration"),
    ("/reset", "Reset model configuration to defaults"),
    ("/exit", "Exit the application"),
];

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        let input = input.to_lowercase();
        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(&input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}

/// The closed set of session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Config,
    History,
    Clear,
    Stats,
    Export,
    Save,
    Load,
    Reset,
    Exit,
    Unknown(String),
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

/// Classifies a raw input line.
///
/// Commands are case-insensitive and must match the whole trimmed line.
/// A bare `exit` also ends the session.
pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    if input.eq_ignore_ascii_case("exit") {
        return Input::Command(SlashCommand::Exit);
    }

    input.strip_prefix('/').map_or_else(
        || Input::Text(input.to_string()),
        |cmd| Input::Command(parse_slash_command(cmd)),
    )
}

fn parse_slash_command(cmd: &str) -> SlashCommand {
    let cmd = cmd.trim().to_lowercase();

    match cmd.as_str() {
        "help" => SlashCommand::Help,
        "config" => SlashCommand::Config,
        "history" => SlashCommand::History,
        "clear" => SlashCommand::Clear,
        "stats" => SlashCommand::Stats,
        "export" => SlashCommand::Export,
        "save" => SlashCommand::Save,
        "load" => SlashCommand::Load,
        "reset" => SlashCommand::Reset,
        "exit" => SlashCommand::Exit,
        _ => SlashCommand::Unknown(cmd),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("  \t "), Input::Empty);
    }

    #[test]
    fn test_parse_text_input_is_trimmed() {
        assert_eq!(
            parse_input("  What is Rust?  "),
            Input::Text("What is Rust?".to_string())
        );
    }

    #[test]
    fn test_parse_every_known_command() {
        let expected = [
            ("/help", SlashCommand::Help),
            ("/config", SlashCommand::Config),
            ("/history", SlashCommand::History),
            ("/clear", SlashCommand::Clear),
            ("/stats", SlashCommand::Stats),
            ("/export", SlashCommand::Export),
            ("/save", SlashCommand::Save),
            ("/load", SlashCommand::Load),
            ("/reset", SlashCommand::Reset),
            ("/exit", SlashCommand::Exit),
        ];

        for (line, command) in expected {
            assert_eq!(parse_input(line), Input::Command(command), "{line}");
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_input("/HeLp"), Input::Command(SlashCommand::Help));
        assert_eq!(parse_input("  /STATS  "), Input::Command(SlashCommand::Stats));
    }

    #[test]
    fn test_parse_bare_exit() {
        assert_eq!(parse_input("exit"), Input::Command(SlashCommand::Exit));
        assert_eq!(parse_input("EXIT"), Input::Command(SlashCommand::Exit));
        assert_eq!(
            parse_input("exit now"),
            Input::Text("exit now".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input("/Unknown"),
            Input::Command(SlashCommand::Unknown("unknown".to_string()))
        );
    }

    #[test]
    fn test_parse_command_with_trailing_words_is_unknown() {
        assert_eq!(
            parse_input("/help me"),
            Input::Command(SlashCommand::Unknown("help me".to_string()))
        );
    }

    #[test]
    fn test_completer_no_suggestions_for_regular_text() {
        let mut completer = SlashCommandCompleter;
        let suggestions = completer.get_suggestions("hello").unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_completer_suggestions_for_slash() {
        let mut completer = SlashCommandCompleter;
        let suggestions = completer.get_suggestions("/").unwrap();
        assert_eq!(suggestions.len(), SLASH_COMMANDS.len());
    }

    #[test]
    fn test_completer_suggestions_filter_by_prefix() {
        let mut completer = SlashCommandCompleter;

        let suggestions = completer.get_suggestions("/s").unwrap();
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].starts_with("/stats"));
        assert!(suggestions[1].starts_with("/save"));

        let suggestions = completer.get_suggestions("/H").unwrap();
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn test_completer_completion() {
        let mut completer = SlashCommandCompleter;
        let suggestion = "/export  Export conversation to file".to_string();
        let completion = completer.get_completion("/ex", Some(suggestion)).unwrap();
        assert_eq!(completion, Some("/export".to_string()));
    }

    #[test]
    fn test_completer_completion_none() {
        let mut completer = SlashCommandCompleter;
        let completion = completer.get_completion("/x", None).unwrap();
        assert!(completion.is_none());
    }
}
