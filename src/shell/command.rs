use inquire::autocompletion::{Autocomplete, Replacement};

// Available slash commands: (command, description)
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/open", "Select an image file"),
    ("/camera", "Open the camera"),
    ("/snap", "Capture a photo from the open camera"),
    ("/cancel", "Close the camera without capturing"),
    ("/detect", "Identify plants in the current image"),
    ("/plants", "Show the last detection"),
    ("/save", "Save the annotated image"),
    ("/clear", "Start over with an empty session"),
    ("/status", "Show the session state"),
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/quit", "Exit the shell"),
];

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') || input.contains(char::is_whitespace) {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
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

/// Slash command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Open(Option<String>),
    Camera,
    Snap,
    Cancel,
    Detect,
    Plants,
    Save(Option<String>),
    Clear,
    Status,
    Config,
    Help,
    Quit,
    Unknown(String),
}

/// Input types
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Message(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Message(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let (name, rest) = cmd
        .split_once(char::is_whitespace)
        .map_or((cmd, ""), |(name, rest)| (name, rest.trim()));
    // Paths may contain spaces, so the argument is the rest of the line.
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match name {
        "open" => SlashCommand::Open(argument),
        "camera" => SlashCommand::Camera,
        "snap" => SlashCommand::Snap,
        "cancel" => SlashCommand::Cancel,
        "detect" => SlashCommand::Detect,
        "plants" => SlashCommand::Plants,
        "save" => SlashCommand::Save(argument),
        "clear" => SlashCommand::Clear,
        "status" => SlashCommand::Status,
        "config" => SlashCommand::Config,
        "help" => SlashCommand::Help,
        "quit" | "exit" | "q" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(cmd.to_string()),
    };
    Input::Command(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("   "), Input::Empty);
    }

    #[test]
    fn test_parse_message_input() {
        assert_eq!(
            parse_input("  Is it safe for cats? "),
            Input::Message("Is it safe for cats?".to_string())
        );
    }

    #[test]
    fn test_parse_open_with_path_containing_spaces() {
        assert_eq!(
            parse_input("/open ~/Pictures/my leaf.jpg"),
            Input::Command(SlashCommand::Open(Some("~/Pictures/my leaf.jpg".to_string())))
        );
    }

    #[test]
    fn test_parse_open_without_path() {
        assert_eq!(
            parse_input("/open"),
            Input::Command(SlashCommand::Open(None))
        );
    }

    #[test]
    fn test_parse_save_optional_path() {
        assert_eq!(
            parse_input("/save"),
            Input::Command(SlashCommand::Save(None))
        );
        assert_eq!(
            parse_input("/save out.jpg"),
            Input::Command(SlashCommand::Save(Some("out.jpg".to_string())))
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        let cases = [
            ("/camera", SlashCommand::Camera),
            ("/snap", SlashCommand::Snap),
            ("/cancel", SlashCommand::Cancel),
            ("/detect", SlashCommand::Detect),
            ("/plants", SlashCommand::Plants),
            ("/clear", SlashCommand::Clear),
            ("/status", SlashCommand::Status),
            ("/config", SlashCommand::Config),
            ("/help", SlashCommand::Help),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_input(line), Input::Command(expected), "{line}");
        }
    }

    #[test]
    fn test_parse_quit_commands() {
        for line in ["/quit", "/exit", "/q"] {
            assert_eq!(parse_input(line), Input::Command(SlashCommand::Quit));
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input("/water daily"),
            Input::Command(SlashCommand::Unknown("water daily".to_string()))
        );
    }

    // SlashCommandCompleter tests

    #[test]
    fn test_completer_no_suggestions_for_regular_text() {
        let mut completer = SlashCommandCompleter;
        assert!(completer.get_suggestions("hello").unwrap().is_empty());
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

        let suggestions = completer.get_suggestions("/c").unwrap();
        assert_eq!(suggestions.len(), 4); // /camera, /cancel, /clear, /config

        let suggestions = completer.get_suggestions("/sn").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("/snap"));
    }

    #[test]
    fn test_completer_stops_after_argument() {
        let mut completer = SlashCommandCompleter;
        assert!(completer.get_suggestions("/open leaf").unwrap().is_empty());
    }

    #[test]
    fn test_completer_completion() {
        let mut completer = SlashCommandCompleter;
        let suggestion = "/detect  Identify plants in the current image".to_string();
        let completion = completer.get_completion("/d", Some(suggestion)).unwrap();
        assert_eq!(completion, Some("/detect".to_string()));
    }

    #[test]
    fn test_completer_completion_none() {
        let mut completer = SlashCommandCompleter;
        assert!(completer.get_completion("/x", None).unwrap().is_none());
    }
}
