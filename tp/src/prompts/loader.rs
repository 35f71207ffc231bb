//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{ParticipantRoster, TripConfiguration};

/// One traveller line in the table-of-contents request
#[derive(Debug, Clone, Serialize)]
pub struct TravellerSummary {
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub preferences: String,
}

/// Context for the guide table-of-contents template
#[derive(Debug, Clone, Serialize)]
pub struct GuideTocContext {
    /// Destinations, comma-joined
    pub destinations: String,
    pub traveller_count: usize,
    pub travellers: Vec<TravellerSummary>,
}

impl GuideTocContext {
    pub fn new(trip: &TripConfiguration, roster: &ParticipantRoster) -> Self {
        debug!(destinations = trip.destinations.len(), travellers = roster.len(), "GuideTocContext::new: called");
        Self {
            destinations: trip.destinations.join(", "),
            traveller_count: roster.len(),
            travellers: roster
                .iter()
                .map(|p| TravellerSummary {
                    name: p.name.clone(),
                    age: p.age,
                    gender: p.gender.to_string(),
                    preferences: p.preference_label(),
                })
                .collect(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.tripplanner/prompts/`)
    user_dir: Option<PathBuf>,
    /// Project default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `root`
    ///
    /// Looks for `.tripplanner/prompts/` and `prompts/` under the root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".tripplanner/prompts");
        let repo_dir = root.join("prompts");

        let user_dir_exists = user_dir.is_dir();
        let repo_dir_exists = repo_dir.is_dir();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "PromptLoader::new: checking directories"
        );

        Self {
            hbs: Self::engine(),
            user_dir: user_dir_exists.then_some(user_dir),
            repo_dir: repo_dir_exists.then_some(repo_dir),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; user fields go in verbatim
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.tripplanner/prompts/{name}.pmt`
    /// 2. Project default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found on disk");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context, trimming surrounding whitespace
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|s| s.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// System instruction that opens the conversation
    pub fn conversation_instruction(&self, briefing: &str) -> Result<String> {
        self.render("conversation", &serde_json::json!({ "briefing": briefing }))
    }

    /// Closing instruction for itinerary synthesis
    pub fn itinerary_instruction(&self) -> Result<String> {
        self.render("itinerary", &serde_json::json!({}))
    }

    pub fn guide_writer(&self) -> Result<String> {
        self.render("guide-writer", &serde_json::json!({}))
    }

    pub fn guide_toc(&self, context: &GuideTocContext) -> Result<String> {
        self.render("guide-toc", context)
    }

    pub fn guide_chapter(&self, title: &str) -> Result<String> {
        self.render("guide-chapter", &serde_json::json!({ "title": title }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, ModelChoice, ParticipantProfile, Preference};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn trip() -> TripConfiguration {
        TripConfiguration::new(
            ModelChoice::Basic,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            ["Thailand", "Laos"],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_conversation_instruction_embeds_briefing_verbatim() {
        let loader = PromptLoader::embedded_only();
        let text = loader
            .conversation_instruction("Notes: <b>spicy</b> & \"hot\"")
            .unwrap();
        assert!(text.starts_with("You are a travel agent"));
        assert!(text.contains("Notes: <b>spicy</b> & \"hot\""));
    }

    #[test]
    fn test_guide_toc_lists_travellers() {
        let roster = ParticipantRoster::from_profiles(vec![
            ParticipantProfile::new("Ana", 29, Gender::Female, Preference::Adventure, ""),
            ParticipantProfile::new("Bo", 41, Gender::Male, Preference::Relax, ""),
        ]);
        let loader = PromptLoader::embedded_only();
        let text = loader.guide_toc(&GuideTocContext::new(&trip(), &roster)).unwrap();
        assert!(text.contains("Countries: Thailand, Laos."));
        assert!(text.contains("Travelers: 2 - Ana (29 years old, Female, Adventure). Bo (41 years old, Male, Relax)."));
    }

    #[test]
    fn test_guide_chapter() {
        let loader = PromptLoader::embedded_only();
        assert_eq!(
            loader.guide_chapter("Street Food").unwrap(),
            "Write a chapter about 'Street Food' for a travel guide."
        );
    }

    #[test]
    fn test_user_override_wins() {
        let dir = TempDir::new().unwrap();
        let prompts = dir.path().join(".tripplanner/prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(prompts.join("guide-writer.pmt"), "You write pocket guides.\n").unwrap();

        let loader = PromptLoader::new(dir.path());
        assert_eq!(loader.guide_writer().unwrap(), "You write pocket guides.");
        // Not overridden, falls back to embedded
        assert!(loader.itinerary_instruction().unwrap().contains("day by day"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
