//! Destination reference data
//!
//! Read-only, alphabetically sorted set of destination names. Loaded from a
//! configured newline-separated file, or the list embedded in the binary.

use std::collections::BTreeSet;

use eyre::{Context, Result};
use tracing::debug;

use crate::config::ReferenceConfig;

const EMBEDDED_DESTINATIONS: &str = include_str!("../data/countries.txt");

#[derive(Debug, Clone, Default)]
pub struct DestinationCatalog {
    names: BTreeSet<String>,
}

impl DestinationCatalog {
    pub fn load(config: &ReferenceConfig) -> Result<Self> {
        debug!(destinations_file = ?config.destinations_file, "DestinationCatalog::load: called");
        match &config.destinations_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .context(format!("Failed to read destinations file {}", path.display()))?;
                Ok(Self::from_lines(&content))
            }
            None => Ok(Self::embedded()),
        }
    }

    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_DESTINATIONS)
    }

    /// Trimmed, non-blank, deduplicated lines
    pub fn from_lines(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    /// Names in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive membership
    pub fn contains(&self, name: &str) -> bool {
        if self.names.contains(name) {
            return true;
        }
        let name = name.to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == name)
    }

    /// Requested destinations missing from the catalog, in request order
    pub fn unknown<'a>(&self, destinations: &'a [String]) -> Vec<&'a str> {
        destinations
            .iter()
            .map(String::as_str)
            .filter(|d| !self.contains(d))
            .collect()
    }

    /// Case-insensitive substring match
    pub fn filter<'a>(&'a self, needle: &str) -> impl Iterator<Item = &'a str> + 'a {
        let needle = needle.to_lowercase();
        self.names().filter(move |n| n.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_lines_sorts_and_drops_blanks() {
        let catalog = DestinationCatalog::from_lines("Laos\n\n  Thailand \nCambodia\nLaos\n   \n");
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Cambodia", "Laos", "Thailand"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_embedded_has_reference_destinations() {
        let catalog = DestinationCatalog::embedded();
        assert!(catalog.contains("Thailand"));
        assert!(catalog.contains("Laos"));
        let names: Vec<&str> = catalog.names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_unknown_keeps_request_order() {
        let catalog = DestinationCatalog::from_lines("Laos\nThailand");
        let requested = vec!["Narnia".to_string(), "Laos".to_string(), "Atlantis".to_string()];
        assert_eq!(catalog.unknown(&requested), vec!["Narnia", "Atlantis"]);
    }

    #[test]
    fn test_unknown_ignores_case() {
        let catalog = DestinationCatalog::from_lines("Laos
Thailand
Côte d'Ivoire");
        let requested = vec!["thailand".to_string(), "LAOS".to_string(), "CÔTE D'IVOIRE".to_string()];
        assert!(catalog.unknown(&requested).is_empty());
        assert!(catalog.contains("tHaIlAnD"));
        assert!(!catalog.contains("thai"));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let catalog = DestinationCatalog::embedded();
        let hits: Vec<&str> = catalog.filter("LAN").collect();
        assert!(hits.contains(&"Thailand"));
        assert!(hits.contains(&"Finland"));
        assert!(!hits.contains(&"Laos"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Peru\nChile").unwrap();
        let config = ReferenceConfig {
            destinations_file: Some(file.path().to_path_buf()),
        };
        let catalog = DestinationCatalog::load(&config).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Chile", "Peru"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let config = ReferenceConfig {
            destinations_file: Some("/nonexistent/destinations.txt".into()),
        };
        assert!(DestinationCatalog::load(&config).is_err());
    }
}
