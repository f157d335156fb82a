//! Step Explanation
//!
//! One model call per step, framed as a mentor talking a beginner through it.
//! The answer is returned as-is apart from outer whitespace.

use crate::{
    error::GenerationError, llm_client::LLMClient, prompts::PromptTemplates,
    session::LearningStep,
};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct StepExplainer {
    llm: Arc<dyn LLMClient>,
    model: String,
    prompts: Arc<PromptTemplates>,
}

impl StepExplainer {
    pub fn new(llm: Arc<dyn LLMClient>, model: String, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, model, prompts }
    }

    /// Explains `step` in the context of `topic`.
    #[instrument(skip(self, step), fields(ordinal = step.ordinal, title = %step.title))]
    pub async fn explain(
        &self,
        topic: &str,
        step: &LearningStep,
    ) -> Result<String, GenerationError> {
        let prompt = self.prompts.render_explain_step(topic, &step.title);
        let explanation = self
            .llm
            .complete(&self.model, &prompt)
            .await
            .map_err(|cause| GenerationError {
                step_ordinal: step.ordinal,
                step_title: step.title.clone(),
                cause,
            })?;
        debug!(len = explanation.len(), "Explanation received");
        Ok(explanation.trim().to_string())
    }
}
