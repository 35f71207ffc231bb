//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;

/// Trip Planner - conversational travel planning
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan a trip with an LLM travel agent and export an itinerary or guide",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the known destinations
    Destinations {
        /// Only show names containing this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print the briefing compiled from a trip file
    Context {
        /// Trip file (YAML)
        trip: PathBuf,
    },

    /// Chat with the travel agent about a trip
    Chat {
        /// Trip file (YAML)
        trip: PathBuf,
    },

    /// Generate an itinerary from a saved conversation
    Itinerary {
        /// Trip file (YAML)
        trip: PathBuf,

        /// Transcript saved with /save
        #[arg(short, long)]
        transcript: PathBuf,
    },

    /// Generate and export a travel guide
    Guide {
        /// Trip file (YAML)
        trip: PathBuf,

        /// Output directory (defaults to the configured export dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format (defaults to the configured export format)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_guide_args() {
        let cli = Cli::try_parse_from(["tp", "-l", "debug", "guide", "trip.yml", "--out", "out", "--format", "json"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Guide { trip, out, format } => {
                assert_eq!(trip, PathBuf::from("trip.yml"));
                assert_eq!(out, Some(PathBuf::from("out")));
                assert_eq!(format, Some(ExportFormat::Json));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_docx_format() {
        let cli = Cli::try_parse_from(["tp", "guide", "trip.yml", "--format", "docx"]).unwrap();
        assert!(matches!(cli.command, Command::Guide { format: Some(ExportFormat::Docx), .. }));
    }

    #[test]
    fn test_itinerary_needs_transcript() {
        assert!(Cli::try_parse_from(["tp", "itinerary", "trip.yml"]).is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("tripplanner/logs/tripplanner.log"));
    }
}
