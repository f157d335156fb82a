//! Prompt Templates
//!
//! Every model call is built from one of three templates. Placeholders in
//! braces (`{topic}`, `{max_steps}`, `{step}`, `{visual_prompt}`) are replaced
//! verbatim. Templates can be overridden from a directory of Markdown files.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::debug;

const DEFAULT_OUTLINE: &str = r#"You are a teaching assistant AI. The user wants to learn about: "{topic}".
Generate a learning outline with at most {max_steps} steps (just the step titles).
Return each step on a new line, with no other text."#;

const DEFAULT_EXPLAIN_STEP: &str = r#"We are learning about "{topic}".
Imagine you're a passionate tutor explaining the following step to a beginner:
"{step}"
Make it conversational, use relatable examples, and guide them like a mentor.
Keep it engaging and understandable."#;

const DEFAULT_VISUALIZE_STEP: &str = r#"Create a beautiful, animated HTML page to help explain:
"{visual_prompt}"
Use advanced web animations using Three.js, Anime.js, or Lottie.
Return full HTML (with embedded JS/CSS), self-contained."#;

/// The set of templates used by the generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub outline: String,
    pub explain_step: String,
    pub visualize_step: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            outline: DEFAULT_OUTLINE.to_string(),
            explain_step: DEFAULT_EXPLAIN_STEP.to_string(),
            visualize_step: DEFAULT_VISUALIZE_STEP.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Loads overrides from `outline.md`, `explain_step.md` and
    /// `visualize_step.md` in `dir`. Missing files keep their defaults.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut templates = Self::default();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?
        {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?;
            let slot = match key {
                "outline" => &mut templates.outline,
                "explain_step" => &mut templates.explain_step,
                "visualize_step" => &mut templates.visualize_step,
                _ => continue,
            };
            *slot = fs::read_to_string(&path)?;
            debug!(prompt = key, "Loaded prompt override");
        }
        Ok(templates)
    }

    pub fn render_outline(&self, topic: &str, max_steps: usize) -> String {
        self.outline
            .replace("{topic}", topic)
            .replace("{max_steps}", &max_steps.to_string())
    }

    pub fn render_explain_step(&self, topic: &str, step: &str) -> String {
        self.explain_step
            .replace("{topic}", topic)
            .replace("{step}", step)
    }

    pub fn render_visualize_step(&self, step: &str, visual_prompt: &str) -> String {
        self.visualize_step
            .replace("{step}", step)
            .replace("{visual_prompt}", visual_prompt)
    }
}
