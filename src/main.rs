//! GenStudio CLI - Generative Media Workflows
//!
//! Command-line interface for the GenStudio workflow engine.

use clap::Parser;
use log::info;

use genstudio::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // One global collector: tracing events from the library, plus the
    // CLI's log records through the compatibility bridge
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("genstudio=info")),
        )
        .init();

    let cli = Cli::parse();

    info!("GenStudio v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("GenStudio v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Video {
            prompt,
            image,
            aspect,
            interval_secs,
            output,
            mock,
        } => commands::video(&prompt, image.as_deref(), &aspect, interval_secs, output, mock),
        Commands::Speech {
            text,
            voice,
            output,
            mock,
        } => commands::speech(&text, &voice, output, mock),
        Commands::Health => commands::health(),
    }
}
