//! Visualization Generation
//!
//! Produces one self-contained, animated HTML document per step, publishes it
//! through the artifact store under a unique key, and hands back either a
//! link to it or the document itself, depending on the configured mode.

use crate::{
    config::{PipelineConfig, VisualizationMode},
    error::{GenerationError, StorageError, VisualizationError},
    llm_client::LLMClient,
    prompts::PromptTemplates,
    session::{ArtifactMode, LearningStep, VisualArtifact},
    store::ArtifactStore,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MAX_SLUG_LEN: usize = 48;
const KEY_SUFFIX_LEN: usize = 8;
const MAX_KEY_ATTEMPTS: usize = 3;

/// Reduces a step title to lowercase ASCII alphanumerics separated by `_`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

/// Builds `step_<slug>_<random hex>.html`; two calls never share a suffix in
/// practice, even for identical titles.
pub fn storage_key(title: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("step_{}_{}.html", slugify(title), &suffix[..KEY_SUFFIX_LEN])
}

fn has_document_marker(content: &str) -> bool {
    content.to_ascii_lowercase().contains("<html")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps a bare fragment in a minimal document titled after the step.
/// Content that already has an `<html` element is returned unchanged.
pub fn wrap_document(content: &str, title: &str) -> String {
    if has_document_marker(content) {
        return content.to_string();
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        content
    )
}

/// Removes a Markdown code fence around the whole answer, if there is one.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("html") on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => trimmed,
    }
}

pub struct VisualizationGenerator {
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn ArtifactStore>,
    model: String,
    prompts: Arc<PromptTemplates>,
    mode: ArtifactMode,
    public_base_url: String,
}

impl VisualizationGenerator {
    /// Returns `None` when the configured mode turns visualization off.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        store: Arc<dyn ArtifactStore>,
        prompts: Arc<PromptTemplates>,
        config: &PipelineConfig,
    ) -> Option<Self> {
        let mode = match config.visualization_mode {
            VisualizationMode::Off => return None,
            VisualizationMode::Link => ArtifactMode::Link,
            VisualizationMode::Inline => ArtifactMode::Inline,
        };
        Some(Self {
            llm,
            store,
            model: config.model_name.clone(),
            prompts,
            mode,
            public_base_url: config.public_base_url(),
        })
    }

    pub fn mode(&self) -> ArtifactMode {
        self.mode
    }

    /// Generates, validates and publishes the document for `step`.
    #[instrument(skip(self, step, visual_prompt), fields(ordinal = step.ordinal, mode = ?self.mode))]
    pub async fn generate(
        &self,
        step: &LearningStep,
        visual_prompt: &str,
    ) -> Result<VisualArtifact, VisualizationError> {
        let prompt = self.prompts.render_visualize_step(&step.title, visual_prompt);
        let raw = self
            .llm
            .complete(&self.model, &prompt)
            .await
            .map_err(|cause| GenerationError {
                step_ordinal: step.ordinal,
                step_title: step.title.clone(),
                cause,
            })?;
        let content = wrap_document(strip_code_fence(&raw), &step.title);

        let (storage_key, reference) = self.publish(step, &content).await?;
        info!(key = %storage_key, "Visualization stored");

        Ok(VisualArtifact {
            step_ordinal: step.ordinal,
            storage_key,
            content,
            mode: self.mode,
            reference,
        })
    }

    /// Stores the document, drawing a fresh key if the store reports a clash.
    async fn publish(
        &self,
        step: &LearningStep,
        content: &str,
    ) -> Result<(String, String), VisualizationError> {
        let mut attempt = 1;
        loop {
            let key = storage_key(&step.title);
            match self.store.put(&key, content).await {
                Ok(stored_at) => {
                    let reference = match self.mode {
                        ArtifactMode::Link => format!("{}/{}", self.public_base_url, key),
                        ArtifactMode::Inline => stored_at,
                    };
                    return Ok((key, reference));
                }
                Err(StorageError::KeyExists { .. }) if attempt < MAX_KEY_ATTEMPTS => {
                    warn!(key = %key, attempt, "Artifact key already taken, retrying with a new suffix");
                    attempt += 1;
                }
                Err(source) => {
                    return Err(VisualizationError::Storage {
                        step_ordinal: step.ordinal,
                        source,
                    });
                }
            }
        }
    }
}
