//! Interactive chat page
//!
//! Drives a [`PlanningSession`] from a readline prompt. Plain lines go to
//! the conversation; slash commands trigger the other transitions.

use std::path::PathBuf;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::conversation::ConversationState;
use crate::domain::{Deliverable, Speaker};
use crate::error::PlannerError;
use crate::export;
use crate::session::PlanningSession;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Retry,
    Itinerary,
    Guide,
    Export,
    Save(Option<PathBuf>),
    Transcript,
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        match cmd {
            "/help" | "/h" => Self::Help,
            "/quit" | "/q" | "/exit" => Self::Quit,
            "/retry" | "/r" => Self::Retry,
            "/itinerary" => Self::Itinerary,
            "/guide" => Self::Guide,
            "/export" => Self::Export,
            "/save" => Self::Save(parts.next().map(PathBuf::from)),
            "/transcript" | "/history" => Self::Transcript,
            other => Self::Unknown(other.to_string()),
        }
    }
}

enum SlashResult {
    Continue,
    Quit,
}

pub struct ChatRepl {
    session: PlanningSession,
    export: ExportConfig,
    title: String,
}

impl ChatRepl {
    pub fn new(session: PlanningSession, export: ExportConfig) -> Self {
        let title = session
            .trip()
            .map(|t| t.destinations.join(" "))
            .unwrap_or_default();
        Self { session, export, title }
    }

    pub async fn run(&mut self) -> Result<()> {
        debug!(session = %self.session.id(), "ChatRepl::run: called");
        self.print_welcome();
        self.start().await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(SlashCommand::parse(input)).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.send(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.session.close();
        info!(session = %self.session.id(), turns = self.session.transcript().len(), "Chat closed");
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Trip Planner".bright_cyan().bold());
        if let Some(trip) = self.session.trip() {
            println!(
                "{} to {}, {} ({} traveller(s), {} model)",
                trip.start_date,
                trip.end_date,
                trip.destinations.join(", "),
                trip.headcount,
                trip.model_choice
            );
        }
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn start(&mut self) {
        println!("{}", "Preparing your travel agent...".dimmed());
        match self.session.start_conversation().await {
            Ok(opening) => {
                if let Some(warning) = &opening.roster_warning {
                    print_error(warning);
                }
                self.show_reply(Ok(opening.reply));
            }
            Err(e) => print_error(&e),
        }
    }

    async fn send(&mut self, input: &str) {
        let result = self.session.send(input).await;
        self.show_reply(result);
    }

    async fn retry(&mut self) {
        match self.session.state() {
            ConversationState::Uninitialized => self.start().await,
            _ => {
                let result = self.session.retry().await;
                self.show_reply(result);
            }
        }
    }

    fn show_reply(&self, result: Result<String, PlannerError>) {
        match result {
            Ok(reply) => {
                println!();
                println!("{} {}", "agent:".bright_blue().bold(), reply);
                println!();
            }
            Err(e) => print_error(&e),
        }
    }

    async fn handle_slash_command(&mut self, command: SlashCommand) -> SlashResult {
        debug!(?command, "handle_slash_command: called");
        match command {
            SlashCommand::Help => self.print_help(),
            SlashCommand::Quit => return SlashResult::Quit,
            SlashCommand::Retry => self.retry().await,
            SlashCommand::Itinerary => {
                println!("{}", "Designing your itinerary...".dimmed());
                match self.session.generate_itinerary().await {
                    Ok(Deliverable::Itinerary { text }) => {
                        println!();
                        println!("{}", "Itinerary".bright_cyan().bold());
                        println!("{}", text);
                        println!();
                    }
                    Ok(_) => {}
                    Err(e) => print_error(&e),
                }
            }
            SlashCommand::Guide => {
                println!("{}", "Writing your travel guide...".dimmed());
                match self.session.generate_guide().await {
                    Ok(Deliverable::Guide(guide)) => {
                        println!();
                        println!("{}", "Table of contents".bright_cyan().bold());
                        for (i, title) in guide.table_of_contents().iter().enumerate() {
                            println!("  {:>2}. {}", i + 1, title);
                        }
                        if !guide.failed_chapters().is_empty() {
                            println!(
                                "{} {} chapter(s) could not be generated",
                                "!".yellow(),
                                guide.failed_chapters().len()
                            );
                        }
                        println!("Use {} to write it to {}", "/export".yellow(), self.export.dir.display());
                        println!();
                    }
                    Ok(_) => {}
                    Err(e) => print_error(&e),
                }
            }
            SlashCommand::Export => match self.session.deliverable() {
                Some(deliverable) => {
                    match export::write_deliverable(&self.export.dir, deliverable, self.export.format, &self.title) {
                        Ok(path) => println!("{} Saved {}", "✓".green(), path.display()),
                        Err(e) => println!("{} {:#}", "✗".red(), e),
                    }
                }
                None => println!("{}", "Nothing to export yet: run /itinerary or /guide first.".dimmed()),
            },
            SlashCommand::Save(None) => println!("Usage: {} <path>", "/save".yellow()),
            SlashCommand::Save(Some(path)) => match export::save_transcript(&path, self.session.transcript()) {
                Ok(()) => println!("{} Saved transcript to {}", "✓".green(), path.display()),
                Err(e) => println!("{} {:#}", "✗".red(), e),
            },
            SlashCommand::Transcript => self.print_transcript(),
            SlashCommand::Unknown(cmd) => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Repeat the last failed request", "/retry".yellow());
        println!("  {:18} Generate a day-by-day itinerary", "/itinerary".yellow());
        println!("  {:18} Generate a multi-chapter travel guide", "/guide".yellow());
        println!("  {:18} Write the last itinerary or guide to disk", "/export".yellow());
        println!("  {:18} Save the conversation as JSON", "/save <path>".yellow());
        println!("  {:18} Show the conversation so far", "/transcript".yellow());
        println!("  {:18} Leave the chat", "/quit".yellow());
        println!();
    }

    fn print_transcript(&self) {
        let transcript = self.session.transcript();
        if transcript.is_empty() {
            println!("{}", "No conversation yet.".dimmed());
            return;
        }

        println!();
        for turn in transcript.iter() {
            let label = match turn.speaker {
                Speaker::System => "system".dimmed(),
                Speaker::User => "you".bright_green(),
                Speaker::Assistant => "agent".bright_blue(),
            };
            let text = if turn.speaker == Speaker::System {
                let preview: String = turn.text.chars().take(80).collect();
                if turn.text.chars().count() > 80 { format!("{}...", preview) } else { preview }
            } else {
                turn.text.clone()
            };
            println!("{}: {}", label, text);
        }
        println!();
    }
}

fn print_error(e: &PlannerError) {
    if e.is_warning() {
        println!("{} {}", "!".yellow(), e);
    } else if e.is_retryable() {
        println!("{} {}", "✗".red(), e);
        println!("Type {} to try again", "/retry".yellow());
    } else {
        println!("{} {}", "✗".red(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(SlashCommand::parse("/help"), SlashCommand::Help);
        assert_eq!(SlashCommand::parse("/q"), SlashCommand::Quit);
        assert_eq!(SlashCommand::parse("/retry"), SlashCommand::Retry);
        assert_eq!(SlashCommand::parse("/itinerary"), SlashCommand::Itinerary);
        assert_eq!(SlashCommand::parse("/guide"), SlashCommand::Guide);
        assert_eq!(SlashCommand::parse("/export"), SlashCommand::Export);
        assert_eq!(SlashCommand::parse("/transcript"), SlashCommand::Transcript);
    }

    #[test]
    fn test_parse_save_path() {
        assert_eq!(
            SlashCommand::parse("/save  chats/trip.json"),
            SlashCommand::Save(Some(PathBuf::from("chats/trip.json")))
        );
        assert_eq!(SlashCommand::parse("/save"), SlashCommand::Save(None));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(SlashCommand::parse("/teleport now"), SlashCommand::Unknown("/teleport".to_string()));
    }
}
