/// A line typed into the interactive console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Plain text: synthesize with the current speaker
    Say {
        speaker: Option<String>,
        text: String,
    },
    Use(String),
    Search(String),
    List,
    Refresh,
    Add {
        id: String,
        wav: String,
        text: Option<String>,
    },
    Remove(String),
    Help,
    Exit,
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>                     synthesize with the current speaker
  /say <speaker> <text>      synthesize with a specific speaker
  /use <speaker>             set the current speaker
  /search [query]            filter the speaker list (empty shows all)
  /list                      show the filtered speaker list
  /refresh                   reload speakers from the server
  /add <id> <wav> [text]     register a speaker from a recording
  /remove <id>               delete a speaker
  /help                      show this message
  /exit                      leave the console";

pub fn parse_command(input: &str) -> ConsoleCommand {
    let input = input.trim();
    let Some(rest) = input.strip_prefix('/') else {
        return ConsoleCommand::Say {
            speaker: None,
            text: input.to_string(),
        };
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "say" => match next_token(args) {
            (speaker, text) if !speaker.is_empty() && !text.is_empty() => ConsoleCommand::Say {
                speaker: Some(speaker.to_string()),
                text: text.to_string(),
            },
            _ => ConsoleCommand::Invalid("usage: /say <speaker> <text>".to_string()),
        },
        "use" if !args.is_empty() => ConsoleCommand::Use(args.to_string()),
        "use" => ConsoleCommand::Invalid("usage: /use <speaker>".to_string()),
        "search" => ConsoleCommand::Search(args.to_string()),
        "list" => ConsoleCommand::List,
        "refresh" => ConsoleCommand::Refresh,
        "add" => {
            let (id, rest) = next_token(args);
            let (wav, text) = next_token(rest);
            if id.is_empty() || wav.is_empty() {
                return ConsoleCommand::Invalid("usage: /add <id> <wav> [text]".to_string());
            }
            ConsoleCommand::Add {
                id: id.to_string(),
                wav: wav.to_string(),
                text: Some(text).filter(|t| !t.is_empty()).map(str::to_string),
            }
        }
        "remove" if !args.is_empty() => ConsoleCommand::Remove(args.to_string()),
        "remove" => ConsoleCommand::Invalid("usage: /remove <id>".to_string()),
        "help" => ConsoleCommand::Help,
        "exit" | "quit" => ConsoleCommand::Exit,
        other => ConsoleCommand::Invalid(format!("unknown command /{other}, try /help")),
    }
}

/// Split off the first whitespace-delimited word; the remainder is trimmed
fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (input, ""),
    }
}
