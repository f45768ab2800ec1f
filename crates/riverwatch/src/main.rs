//! riverwatch CLI: stream river status events or issue control commands.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use clap::{Parser, Subcommand};
use riverwatch::{ClientPhase, CommandSink, EventFilter, RiverStatusClient, StatusEvent};
use riverwatch_core::Config;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "riverwatch", version, about = "River status protocol client")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a config file (default: $XDG_CONFIG_HOME/riverwatch/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stream decoded status events to stdout, one per line (default).
    Watch,
    /// Toggle a tag (0-31) in the focused tag set of the focused output.
    ToggleTag {
        /// Tag index to toggle.
        tag: u8,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    riverwatch_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(),
        Command::ToggleTag { tag } => {
            CommandSink::new(&config.control).toggle_tag(tag);
            ExitCode::SUCCESS
        }
    }
}

/// Run the client until it terminates, printing every event.
fn watch() -> ExitCode {
    let client = RiverStatusClient::new();
    let events = client.subscribe(EventFilter::all());
    client.start();

    loop {
        match events.recv_timeout(Duration::from_millis(500)) {
            Ok(event) => println!("{}", format_event(&event)),
            Err(RecvTimeoutError::Timeout) => {
                if client.phase() == ClientPhase::Terminated {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    match client.join() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// One stable, line-oriented rendering per event, for scripting.
fn format_event(event: &StatusEvent) -> String {
    fn tag_list(tags: &[u8]) -> String {
        tags.iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    match event {
        StatusEvent::Ready => "ready".to_string(),
        StatusEvent::FocusedTagsChanged { output_id, tags } => {
            format!("focused-tags output={} tags={}", output_id, tag_list(tags))
        }
        StatusEvent::ViewTagsChanged { output_id, tags } => {
            format!("view-tags output={} tags={}", output_id, tag_list(tags))
        }
        StatusEvent::UrgentTagsChanged { output_id, tags } => {
            format!("urgent-tags output={} tags={}", output_id, tag_list(tags))
        }
        StatusEvent::ActiveWindowChanged { title } => {
            format!("active-window title={title:?}")
        }
        StatusEvent::OutputRemoved { output_id } => {
            format!("output-removed output={output_id}")
        }
    }
}
