//! Text-generation collaborator.
//!
//! Tools that need free-form copy ask a [`TextGenerator`]. The production
//! backend lives outside this crate; [`CannedTextGenerator`] is a
//! deterministic stand-in.

use {anyhow::Result, async_trait::async_trait};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Returns a fixed summary derived from the prompt
#[derive(Debug, Default, Clone)]
pub struct CannedTextGenerator;

#[async_trait]
impl TextGenerator for CannedTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let subject = prompt.lines().next().unwrap_or_default().trim();
        Ok(format!(
            "Summary for {subject}: demand is steady, pricing is competitive, and guest feedback points to strong location appeal."
        ))
    }
}
