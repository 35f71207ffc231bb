//! Deliverable export
//!
//! Guides become one top-level section per chapter; itineraries a single
//! section. Files land under the export directory with a timestamped slug.
//! Word output is a `.docx` with one heading paragraph per section.

use std::path::{Path, PathBuf};

use docx_rs::{Docx, Paragraph, Run};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Deliverable, Guide, Transcript};

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
    Docx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Docx => "docx",
        }
    }

    /// Formats written as text rather than a binary container
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Docx)
    }
}

/// One `# <title>` section per chapter
pub fn render_markdown(guide: &Guide) -> String {
    let mut md = String::new();
    for (title, body) in guide.sections() {
        md.push_str(&format!("# {}\n\n", title));
        md.push_str(body.trim());
        md.push_str("\n\n");
    }
    md
}

pub fn render_itinerary_markdown(itinerary: &str) -> String {
    format!("# Itinerary\n\n{}\n", itinerary.trim())
}

pub fn render_json(deliverable: &Deliverable) -> Result<String> {
    serde_json::to_string_pretty(deliverable).context("Failed to serialize deliverable")
}

/// Heading and body pairs, in document order
fn sections(deliverable: &Deliverable) -> Vec<(&str, &str)> {
    match deliverable {
        Deliverable::Guide(guide) => guide.sections().collect(),
        Deliverable::Itinerary { text } => vec![("Itinerary", text.as_str())],
    }
}

/// Build a Word document with one bold heading per section
pub fn build_docx(deliverable: &Deliverable) -> Docx {
    let mut doc = Docx::new();
    for (title, body) in sections(deliverable) {
        doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(title).bold().size(32)));
        for line in body.trim().lines() {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }
    }
    doc
}

fn write_docx(path: &Path, deliverable: &Deliverable) -> Result<()> {
    let file = std::fs::File::create(path).context(format!("Failed to create {}", path.display()))?;
    build_docx(deliverable)
        .build()
        .pack(file)
        .context(format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Render a deliverable in a text format
pub fn render(deliverable: &Deliverable, format: ExportFormat) -> Result<String> {
    match (format, deliverable) {
        (ExportFormat::Docx, _) => eyre::bail!("docx is a binary format; use write_deliverable"),
        (ExportFormat::Json, _) => render_json(deliverable),
        (ExportFormat::Markdown, Deliverable::Guide(guide)) => Ok(render_markdown(guide)),
        (ExportFormat::Markdown, Deliverable::Itinerary { text }) => Ok(render_itinerary_markdown(text)),
    }
}

/// Write a deliverable to `<dir>/<timestamp>-<kind>-<slug>.<ext>`
pub fn write_deliverable(dir: &Path, deliverable: &Deliverable, format: ExportFormat, title: &str) -> Result<PathBuf> {
    debug!(dir = %dir.display(), kind = deliverable.kind(), ?format, "write_deliverable: called");
    std::fs::create_dir_all(dir).context("Failed to create export directory")?;

    let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let slug = slugify(title);
    let filename = if slug.is_empty() {
        format!("{}-{}.{}", timestamp, deliverable.kind(), format.extension())
    } else {
        format!("{}-{}-{}.{}", timestamp, deliverable.kind(), slug, format.extension())
    };
    let path = dir.join(filename);

    if format.is_text() {
        let content = render(deliverable, format)?;
        std::fs::write(&path, content).context(format!("Failed to write {}", path.display()))?;
    } else {
        write_docx(&path, deliverable)?;
    }

    info!(path = %path.display(), "Deliverable exported");
    Ok(path)
}

/// Save a transcript as pretty JSON
pub fn save_transcript(path: &Path, transcript: &Transcript) -> Result<()> {
    debug!(path = %path.display(), turns = transcript.len(), "save_transcript: called");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create transcript directory")?;
    }
    let json = serde_json::to_string_pretty(transcript).context("Failed to serialize transcript")?;
    std::fs::write(path, json).context(format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn load_transcript(path: &Path) -> Result<Transcript> {
    debug!(path = %path.display(), "load_transcript: called");
    let content = std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse transcript")
}

/// Lowercase, hyphen-separated, apostrophes dropped, at most 50 chars
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConversationTurn;
    use tempfile::TempDir;

    fn guide() -> Guide {
        let mut guide = Guide::new();
        guide.push_chapter("Arrival", "Land in Bangkok.\n");
        guide.push_chapter("Street Food", "Try khao soi.");
        guide
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Thailand, Laos"), "thailand-laos");
        assert_eq!(slugify("Côte d'Ivoire"), "côte-divoire");
        assert_eq!(slugify("  --  "), "");
        assert_eq!(slugify(&"a".repeat(80)).len(), 50);
    }

    #[test]
    fn test_markdown_one_section_per_chapter() {
        let md = render_markdown(&guide());
        assert_eq!(md, "# Arrival\n\nLand in Bangkok.\n\n# Street Food\n\nTry khao soi.\n\n");
        assert_eq!(md.lines().filter(|l| l.starts_with("# ")).count(), 2);
    }

    #[test]
    fn test_itinerary_markdown() {
        let md = render(
            &Deliverable::Itinerary {
                text: "Day 1: Bangkok\n".to_string(),
            },
            ExportFormat::Markdown,
        )
        .unwrap();
        assert_eq!(md, "# Itinerary\n\nDay 1: Bangkok\n");
    }

    #[test]
    fn test_json_is_tagged() {
        let json = render_json(&Deliverable::Guide(guide())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "guide");
        assert_eq!(value["chapters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_deliverable() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("guides");
        let path = write_deliverable(&dir, &Deliverable::Guide(guide()), ExportFormat::Markdown, "Thailand, Laos").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("-guide-thailand-laos.md"), "{}", name);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Arrival"));
    }

    #[test]
    fn test_write_docx_guide() {
        let temp = TempDir::new().unwrap();
        let path = write_deliverable(temp.path(), &Deliverable::Guide(guide()), ExportFormat::Docx, "Laos").unwrap();

        assert_eq!(path.extension().unwrap(), "docx");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "docx is a zip container");
        assert!(render(&Deliverable::Guide(guide()), ExportFormat::Docx).is_err());
    }

    #[test]
    fn test_docx_sections_match_markdown() {
        let itinerary = Deliverable::Itinerary {
            text: "Day 1: Bangkok\nDay 2: Ayutthaya".to_string(),
        };
        assert_eq!(sections(&itinerary), vec![("Itinerary", "Day 1: Bangkok\nDay 2: Ayutthaya")]);
        assert_eq!(
            sections(&Deliverable::Guide(guide())),
            vec![("Arrival", "Land in Bangkok.\n"), ("Street Food", "Try khao soi.")]
        );
    }

    #[test]
    fn test_transcript_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("chat.json");
        let transcript = Transcript::from(vec![
            ConversationTurn::system("brief"),
            ConversationTurn::assistant("What is your budget?"),
        ]);
        save_transcript(&path, &transcript).unwrap();
        assert_eq!(load_transcript(&path).unwrap(), transcript);
    }
}
