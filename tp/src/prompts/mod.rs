//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files.
//!
//! Template loading chain:
//! 1. `.tripplanner/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (project default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution. Escaping is
//! disabled: free-text fields reach the model exactly as typed.

pub mod embedded;
mod loader;

pub use loader::{GuideTocContext, PromptLoader, TravellerSummary};
