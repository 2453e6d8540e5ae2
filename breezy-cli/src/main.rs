use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod interactive_app;

use crate::app::App;
use crate::interactive_app::{print_speakers, InteractiveApp};

#[derive(Parser, Debug)]
#[command(name = "breezy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BreezyVoice console - synthesize speech and manage speakers")]
struct Args {
    /// Inference server URL, overrides the settings file
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Settings file to use instead of ~/.breezy/settings.toml
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize text with a registered speaker
    Say {
        #[arg(long, short)]
        speaker: Option<String>,

        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Play the result after writing it
        #[arg(long)]
        play: bool,

        text: String,
    },

    /// Synthesize text in the voice of a prompt recording, without registering it
    Clone {
        #[arg(long, value_name = "FILE")]
        prompt_wav: PathBuf,

        /// Transcript of the prompt recording
        #[arg(long)]
        prompt_text: String,

        #[arg(long, short)]
        output: Option<PathBuf>,

        text: String,
    },

    /// Synthesize through the OpenAI-compatible server
    Speech {
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 1.0)]
        speed: f32,

        text: String,
    },

    /// List models served by the OpenAI-compatible server
    Models,

    /// Manage registered speakers
    Speakers {
        #[command(subcommand)]
        action: SpeakersCommand,
    },

    /// Interactive console
    Console,
}

#[derive(Subcommand, Debug)]
enum SpeakersCommand {
    List {
        /// Case-insensitive substring filter
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        #[arg(long)]
        id: String,

        /// Reference recording of the new voice
        #[arg(long, value_name = "FILE")]
        wav: PathBuf,

        /// Transcript of the recording; the server transcribes it when omitted
        #[arg(long)]
        text: Option<String>,
    },
    Remove {
        #[arg(long)]
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();
    info!("CLI startup: command={:?}", args.command);

    let app = App::new(args.settings, args.server)?;

    match args.command {
        Command::Say {
            speaker,
            output,
            play,
            text,
        } => {
            let speaker = app.speaker_or_default(speaker)?;
            let path = app.say(&text, &speaker, output, play).await?;
            println!("Saved {}", path.display());
        }
        Command::Clone {
            prompt_wav,
            prompt_text,
            output,
            text,
        } => {
            let path = app
                .clone_voice(&text, &prompt_wav, &prompt_text, output)
                .await?;
            println!("Saved {}", path.display());
        }
        Command::Speech {
            output,
            speed,
            text,
        } => {
            let path = app.speech(&text, speed, output).await?;
            println!("Saved {}", path.display());
        }
        Command::Models => {
            for model in app.models().await? {
                println!("{model}");
            }
        }
        Command::Speakers { action } => run_speakers(&app, action).await?,
        Command::Console => InteractiveApp::new(app).run().await?,
    }

    Ok(())
}

async fn run_speakers(app: &App, action: SpeakersCommand) -> Result<()> {
    let console = app.console();
    match action {
        SpeakersCommand::List { search } => {
            console.refresh().await?;
            print_speakers(&console.search(search.as_deref().unwrap_or("")));
        }
        SpeakersCommand::Add { id, wav, text } => {
            println!("{}", app.add_speaker(&id, &wav, text.as_deref()).await?);
        }
        SpeakersCommand::Remove { id, yes } => {
            if !yes && !confirm(&format!("Remove speaker {id}? [y/N] "))? {
                return Ok(());
            }
            println!("{}", console.remove_speaker(&id).await?);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut rl = rustyline::DefaultEditor::new()?;
    let answer = rl.readline(prompt)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let trace_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".breezy")
        .join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("breezy.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
