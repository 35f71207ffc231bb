//! Final session output handed to the export boundary

use serde::Serialize;

/// A multi-chapter travel guide
///
/// Titles and bodies are kept in lockstep: every constructor pushes both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Guide {
    table_of_contents: Vec<String>,
    chapters: Vec<String>,
    /// Indices of chapters whose body is an error placeholder
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_chapters: Vec<usize>,
}

impl Guide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chapter(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.table_of_contents.push(title.into());
        self.chapters.push(body.into());
    }

    /// Append a chapter whose body request failed
    pub fn push_failed_chapter(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.failed_chapters.push(self.chapters.len());
        self.push_chapter(title, body);
    }

    pub fn table_of_contents(&self) -> &[String] {
        &self.table_of_contents
    }

    pub fn chapters(&self) -> &[String] {
        &self.chapters
    }

    pub fn failed_chapters(&self) -> &[usize] {
        &self.failed_chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// (title, body) pairs in order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table_of_contents
            .iter()
            .zip(self.chapters.iter())
            .map(|(t, b)| (t.as_str(), b.as_str()))
    }
}

/// What the session produces once planning is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Deliverable {
    Itinerary { text: String },
    Guide(Guide),
}

impl Deliverable {
    /// Short name used in file names and messages
    pub fn kind(&self) -> &'static str {
        match self {
            Deliverable::Itinerary { .. } => "itinerary",
            Deliverable::Guide(_) => "guide",
        }
    }
}
