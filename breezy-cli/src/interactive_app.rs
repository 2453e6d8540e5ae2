use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

use crate::app::App;
use crate::commands::{parse_command, ConsoleCommand, HELP};

/// Line-based console: the current speaker plays the role of the page's
/// speaker dropdown and `/search` its filter box
pub struct InteractiveApp {
    app: App,
    speaker: Option<String>,
}

impl InteractiveApp {
    pub fn new(app: App) -> Self {
        let speaker = app.settings().default_speaker.clone();
        Self { app, speaker }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        println!("Type text to synthesize, /help for commands, /exit to quit");
        match self.app.console().refresh().await {
            Ok(speakers) => print_speakers(&speakers),
            Err(e) => eprintln!("Failed to load speakers: {e}"),
        }

        loop {
            let prompt = format!(
                "\x1b[35m{}>\x1b[0m ",
                self.speaker.as_deref().unwrap_or("")
            );
            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => break,
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let _ = rl.add_history_entry(input);

            let command = parse_command(input);
            if command == ConsoleCommand::Exit {
                break;
            }
            if let Err(e) = self.handle(command, &mut rl).await {
                eprintln!("Error: {e:#}");
            }
        }

        Ok(())
    }

    async fn handle(&mut self, command: ConsoleCommand, rl: &mut DefaultEditor) -> Result<()> {
        let console = self.app.console();
        match command {
            ConsoleCommand::Say { speaker, text } => {
                let speaker = speaker.or_else(|| self.speaker.clone()).unwrap_or_default();
                let path = self.app.say(&text, &speaker, None, false).await?;
                println!("Saved {}", path.display());
            }
            ConsoleCommand::Use(speaker) => {
                if !console.speakers().contains(&speaker) {
                    println!("Note: {speaker} is not in the last fetched speaker list");
                }
                self.speaker = Some(speaker);
            }
            ConsoleCommand::Search(query) => print_speakers(&console.search(&query)),
            ConsoleCommand::List => print_speakers(&console.visible()),
            ConsoleCommand::Refresh => print_speakers(&console.refresh().await?),
            ConsoleCommand::Add { id, wav, text } => {
                let message = self
                    .app
                    .add_speaker(&id, Path::new(&wav), text.as_deref())
                    .await?;
                println!("{message}");
                print_speakers(&console.visible());
            }
            ConsoleCommand::Remove(id) => {
                let answer = rl.readline(&format!("Remove speaker {id}? [y/N] "))?;
                if !answer.trim().eq_ignore_ascii_case("y") {
                    return Ok(());
                }
                let message = console.remove_speaker(&id).await?;
                println!("{message}");
                if self.speaker.as_deref() == Some(id.as_str()) {
                    self.speaker = None;
                }
                print_speakers(&console.visible());
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Invalid(msg) => println!("{msg}"),
            ConsoleCommand::Exit => {}
        }
        Ok(())
    }
}

pub fn print_speakers(speakers: &[String]) {
    if speakers.is_empty() {
        println!("(no speakers)");
        return;
    }
    for speaker in speakers {
        println!("  {speaker}");
    }
}
