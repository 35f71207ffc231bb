//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System instruction that seeds the planning conversation
pub const CONVERSATION: &str = include_str!("../../prompts/conversation.pmt");

/// Closing instruction appended to the flattened transcript
pub const ITINERARY: &str = include_str!("../../prompts/itinerary.pmt");

/// Persona for guide requests
pub const GUIDE_WRITER: &str = include_str!("../../prompts/guide-writer.pmt");

/// Table-of-contents request
pub const GUIDE_TOC: &str = include_str!("../../prompts/guide-toc.pmt");

/// Single chapter request
pub const GUIDE_CHAPTER: &str = include_str!("../../prompts/guide-chapter.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "conversation" => Some(CONVERSATION),
        "itinerary" => Some(ITINERARY),
        "guide-writer" => Some(GUIDE_WRITER),
        "guide-toc" => Some(GUIDE_TOC),
        "guide-chapter" => Some(GUIDE_CHAPTER),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_conversation() {
        let prompt = get_embedded("conversation").unwrap();
        assert!(prompt.contains("travel agent"));
        assert!(prompt.contains("{{briefing}}"));
    }

    #[test]
    fn test_get_embedded_itinerary() {
        assert!(get_embedded("itinerary").unwrap().contains("day by day"));
    }

    #[test]
    fn test_get_embedded_guide_templates() {
        assert!(get_embedded("guide-writer").unwrap().contains("travel guide writer"));
        assert!(get_embedded("guide-toc").unwrap().contains("table of contents"));
        assert!(get_embedded("guide-chapter").unwrap().contains("{{title}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
