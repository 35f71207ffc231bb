//! Trip Planner - CLI entry point

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use tripplanner::cli::{Cli, Command, get_log_path};
use tripplanner::config::Config;
use tripplanner::context::ContextCompiler;
use tripplanner::export::{self, ExportFormat};
use tripplanner::llm::{LlmClient, create_client};
use tripplanner::prompts::PromptLoader;
use tripplanner::provider::Provider;
use tripplanner::reference::DestinationCatalog;
use tripplanner::repl::ChatRepl;
use tripplanner::session::PlanningSession;
use tripplanner::synth::Synthesizer;
use tripplanner::tripfile::TripFile;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level from config file first, before the full load can log
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, basic = %config.llm.basic_model, advanced = %config.llm.advanced_model, "Trip Planner loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Destinations { filter } => cmd_destinations(&config, filter.as_deref()),
        Command::Context { trip } => cmd_context(&config, &trip),
        Command::Chat { trip } => cmd_chat(&config, &trip).await,
        Command::Itinerary { trip, transcript } => cmd_itinerary(&config, &trip, &transcript).await,
        Command::Guide { trip, out, format } => cmd_guide(&config, &trip, out, format).await,
    }
}

fn cmd_destinations(config: &Config, filter: Option<&str>) -> Result<()> {
    debug!(?filter, "cmd_destinations: called");
    let catalog = DestinationCatalog::load(&config.reference)?;
    match filter {
        Some(needle) => catalog.filter(needle).for_each(|name| println!("{}", name)),
        None => catalog.names().for_each(|name| println!("{}", name)),
    }
    Ok(())
}

fn cmd_context(config: &Config, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "cmd_context: called");
    let file = load_trip_file(config, path)?;
    let (trip, roster) = file.into_setup(&config.roster)?;
    if let Err(e) = roster.check_complete(trip.headcount) {
        warn!(error = %e, "Roster incomplete");
        eprintln!("{} {}", "!".yellow(), e);
    }

    let compiler = ContextCompiler::from_config(&config.context);
    print!("{}", compiler.compile(&trip, &roster));
    Ok(())
}

async fn cmd_chat(config: &Config, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "cmd_chat: called");
    let file = load_trip_file(config, path)?;
    let llm = create_client(&config.llm)?;
    let session = build_session(config, file, llm)?;

    let mut repl = ChatRepl::new(session, config.export.clone());
    repl.run().await
}

async fn cmd_itinerary(config: &Config, path: &Path, transcript_path: &Path) -> Result<()> {
    debug!(path = %path.display(), transcript = %transcript_path.display(), "cmd_itinerary: called");
    let file = load_trip_file(config, path)?;
    let transcript = export::load_transcript(transcript_path)?;
    let llm = create_client(&config.llm)?;

    let synth = Synthesizer::new(
        Provider::new(llm, config.llm.timeout()),
        Arc::new(prompt_loader()?),
        config.llm.clone(),
        config.guide.clone(),
    );
    println!("{}", "Designing your itinerary...".dimmed());
    let itinerary = synth.synthesize_itinerary(&transcript, file.trip.model_choice).await?;
    println!("{}", itinerary);
    Ok(())
}

async fn cmd_guide(config: &Config, path: &Path, out: Option<PathBuf>, format: Option<ExportFormat>) -> Result<()> {
    debug!(path = %path.display(), ?out, ?format, "cmd_guide: called");
    let file = load_trip_file(config, path)?;
    let title = file.trip.destinations.join(" ");
    let llm = create_client(&config.llm)?;
    let mut session = build_session(config, file, llm)?;
    if let Err(e) = session.check_roster() {
        eprintln!("{} {}", "!".yellow(), e);
    }

    println!("{}", "Writing your travel guide...".dimmed());
    let guide = session.generate_guide().await?;

    let dir = out.unwrap_or_else(|| config.export.dir.clone());
    let format = format.unwrap_or(config.export.format);
    let written = export::write_deliverable(&dir, guide, format, &title)?;
    println!("{} Saved {}", "✓".green(), written.display());
    Ok(())
}

/// Load a trip file and warn about destinations the catalog doesn't know
fn load_trip_file(config: &Config, path: &Path) -> Result<TripFile> {
    let file = TripFile::load(path)?;
    match DestinationCatalog::load(&config.reference) {
        Ok(catalog) => {
            for name in catalog.unknown(&file.trip.destinations) {
                warn!(destination = %name, "Destination not in catalog");
                eprintln!("{} Unknown destination: {}", "!".yellow(), name);
            }
        }
        Err(e) => warn!(error = %e, "Could not load destination catalog"),
    }
    Ok(file)
}

/// Submit the setup page and the participant list from a trip file
fn build_session(config: &Config, file: TripFile, llm: Arc<dyn LlmClient>) -> Result<PlanningSession> {
    let mut session = PlanningSession::new(llm, Arc::new(prompt_loader()?), config);
    session.configure_trip(file.trip)?;
    session.begin_roster();
    for profile in file.participants {
        session.save_participant(profile)?;
    }
    Ok(session)
}

fn prompt_loader() -> Result<PromptLoader> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(PromptLoader::new(cwd))
}
