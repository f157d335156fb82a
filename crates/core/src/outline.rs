//! Outline Generation
//!
//! Turns a topic into an ordered list of step titles with one model call and
//! a pure line-parsing rule. An outline that parses to nothing is returned as
//! an empty list; deciding what to tell the learner is the caller's job.

use crate::{
    error::ModelError, llm_client::LLMClient, prompts::PromptTemplates, session::LearningStep,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Characters allowed in a leading list marker ("1.", "2)", "-", ...).
fn is_marker_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == ')' || c == '-' || c.is_whitespace()
}

/// Removes a leading list marker from one outline line.
///
/// Only characters from the marker class are stripped, so "2) Loops" becomes
/// "Loops" while "Big-O notation" keeps its hyphen.
pub fn strip_list_marker(line: &str) -> &str {
    line.trim_start_matches(is_marker_char).trim_end()
}

/// Parses a line-delimited model response into at most `max_steps` titles,
/// preserving source order.
pub fn parse_outline(text: &str, max_steps: usize) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(strip_list_marker)
        .filter(|title| !title.is_empty())
        .take(max_steps)
        .map(str::to_string)
        .collect()
}

/// Generates lesson outlines through the model collaborator.
pub struct OutlineGenerator {
    llm: Arc<dyn LLMClient>,
    model: String,
    prompts: Arc<PromptTemplates>,
}

impl OutlineGenerator {
    pub fn new(llm: Arc<dyn LLMClient>, model: String, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, model, prompts }
    }

    /// Asks the model for up to `max_steps` titles and parses the answer into
    /// numbered steps (ordinals start at 1).
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn generate(
        &self,
        topic: &str,
        max_steps: usize,
    ) -> Result<Vec<LearningStep>, ModelError> {
        let prompt = self.prompts.render_outline(topic, max_steps);
        let raw = self.llm.complete(&self.model, &prompt).await?;
        debug!(response_len = raw.len(), "Outline response received");

        let steps: Vec<LearningStep> = parse_outline(&raw, max_steps)
            .into_iter()
            .enumerate()
            .map(|(i, title)| LearningStep::new(i + 1, title))
            .collect();
        info!(steps = steps.len(), "Outline parsed");
        Ok(steps)
    }
}
