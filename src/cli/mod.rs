//! CLI Module
//!
//! Command-line interface for the GenStudio workflow engine.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::DEFAULT_VOICE;

/// GenStudio - generative video and speech from the command line
#[derive(Parser, Debug)]
#[command(name = "genstudio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a video from a prompt, optionally animating an image
    #[command(name = "video")]
    Video {
        /// Text description of the desired video
        prompt: String,

        /// Starting image to animate (image-to-video)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Aspect ratio: 16:9 or 9:16
        #[arg(short, long, default_value = "16:9")]
        aspect: String,

        /// Seconds between status polls
        #[arg(long, default_value_t = 10)]
        interval_secs: u64,

        /// Output file (default: timestamped .mp4 in the working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run against the offline mock service instead of the remote API
        #[arg(long)]
        mock: bool,
    },

    /// Synthesize speech and write a playable WAV file
    #[command(name = "speech")]
    Speech {
        /// Text to speak
        text: String,

        /// Prebuilt voice name
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,

        /// Output file (default: timestamped .wav in the working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run against the offline mock service instead of the remote API
        #[arg(long)]
        mock: bool,
    },

    /// Check that the remote service is reachable
    #[command(name = "health")]
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_video_command() {
        let cli = Cli::parse_from([
            "genstudio",
            "video",
            "a raccoon on a skateboard",
            "--aspect",
            "9:16",
            "--mock",
        ]);

        match cli.command {
            Some(Commands::Video {
                prompt,
                aspect,
                interval_secs,
                mock,
                ..
            }) => {
                assert_eq!(prompt, "a raccoon on a skateboard");
                assert_eq!(aspect, "9:16");
                assert_eq!(interval_secs, 10);
                assert!(mock);
            }
            other => panic!("expected video command, got: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_speech_command_defaults() {
        let cli = Cli::parse_from(["genstudio", "speech", "hello"]);

        match cli.command {
            Some(Commands::Speech { voice, mock, .. }) => {
                assert_eq!(voice, DEFAULT_VOICE);
                assert!(!mock);
            }
            other => panic!("expected speech command, got: {:?}", other),
        }
    }
}
