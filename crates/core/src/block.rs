//! Lesson Blocks
//!
//! The units a lesson stream emits, in a JSON shape for transports and a
//! Markdown rendering for chat frontends.

use crate::session::{ArtifactMode, LearningStep, VisualArtifact};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COMPLETION_MESSAGE: &str =
    "That's the end of our lesson! Let me know if you'd like to explore anything deeper or go over examples again.";

/// The visual part of a step block. Exactly one representation is carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StepVisual {
    Link { url: String },
    Inline { html: String },
}

impl From<VisualArtifact> for StepVisual {
    fn from(artifact: VisualArtifact) -> Self {
        match artifact.mode {
            ArtifactMode::Link => StepVisual::Link {
                url: artifact.reference,
            },
            ArtifactMode::Inline => StepVisual::Inline {
                html: artifact.content,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonBlock {
    /// The lesson plan: topic and the step titles in order.
    Outline {
        topic: String,
        steps: Vec<LearningStep>,
    },
    /// One finished step.
    Step {
        ordinal: usize,
        title: String,
        explanation: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        visual: Option<StepVisual>,
    },
    Completion { message: String },
    /// The lesson ended early. `ordinal` names the step that failed, if any.
    Failure {
        #[serde(skip_serializing_if = "Option::is_none")]
        ordinal: Option<usize>,
        reason: String,
    },
}

impl LessonBlock {
    pub fn is_step(&self) -> bool {
        matches!(self, LessonBlock::Step { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LessonBlock::Failure { .. })
    }

    /// Renders the block as Markdown.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LessonBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonBlock::Outline { topic, steps } => {
                write!(f, "📘 Here's how we'll explore **{}**:", topic)?;
                for step in steps {
                    write!(f, "\n{}. {}", step.ordinal, step.title)?;
                }
                Ok(())
            }
            LessonBlock::Step {
                ordinal,
                title,
                explanation,
                visual,
            } => {
                write!(f, "\n---\n\n### Step {}: {}\n{}\n", ordinal, title, explanation)?;
                match visual {
                    Some(StepVisual::Link { url }) => {
                        write!(f, "\n👉 [View Animation]({})\n", url)
                    }
                    Some(StepVisual::Inline { html }) => {
                        write!(f, "\n#### 🖼️ Visualization (HTML)\n```html\n{}\n```\n", html)
                    }
                    None => Ok(()),
                }
            }
            LessonBlock::Completion { message } => write!(f, "\n✅ {}", message),
            LessonBlock::Failure {
                ordinal: Some(ordinal),
                reason,
            } => write!(f, "\n⚠️ The lesson stopped at step {}: {}", ordinal, reason),
            LessonBlock::Failure {
                ordinal: None,
                reason,
            } => write!(f, "⚠️ {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_render_is_one_indexed() {
        let block = LessonBlock::Outline {
            topic: "Recursion".to_string(),
            steps: vec![LearningStep::new(1, "Basics"), LearningStep::new(2, "Base Case")],
        };
        assert_eq!(
            block.render(),
            "📘 Here's how we'll explore **Recursion**:\n1. Basics\n2. Base Case"
        );
    }

    #[test]
    fn test_step_render_with_link() {
        let block = LessonBlock::Step {
            ordinal: 2,
            title: "Loops".to_string(),
            explanation: "Loops repeat things.".to_string(),
            visual: Some(StepVisual::Link {
                url: "http://localhost:9099/outputs/step_loops_1234abcd.html".to_string(),
            }),
        };
        let text = block.render();
        assert!(text.contains("### Step 2: Loops\nLoops repeat things."));
        assert!(text.contains("👉 [View Animation](http://localhost:9099/outputs/step_loops_1234abcd.html)"));
        assert!(!text.contains("```html"));
    }

    #[test]
    fn test_step_render_inline_embeds_document() {
        let block = LessonBlock::Step {
            ordinal: 1,
            title: "Stack".to_string(),
            explanation: "LIFO.".to_string(),
            visual: Some(StepVisual::Inline {
                html: "<html><body>stack</body></html>".to_string(),
            }),
        };
        let text = block.render();
        assert!(text.contains("```html\n<html><body>stack</body></html>\n```"));
        assert!(!text.contains("View Animation"));
    }

    #[test]
    fn test_block_json_shape() {
        let block = LessonBlock::Step {
            ordinal: 1,
            title: "Basics".to_string(),
            explanation: "Hi".to_string(),
            visual: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "step");
        assert_eq!(json["ordinal"], 1);
        assert!(json.get("visual").is_none());

        let failure = LessonBlock::Failure {
            ordinal: None,
            reason: "the topic is empty".to_string(),
        };
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"type":"failure","reason":"the topic is empty"}"#);
    }

    #[test]
    fn test_visual_from_artifact_picks_one_representation() {
        let artifact = VisualArtifact {
            step_ordinal: 1,
            storage_key: "step_a_00000000.html".to_string(),
            content: "<html></html>".to_string(),
            mode: ArtifactMode::Link,
            reference: "http://h:1/outputs/step_a_00000000.html".to_string(),
        };
        let visual = StepVisual::from(artifact.clone());
        assert_eq!(
            visual,
            StepVisual::Link {
                url: "http://h:1/outputs/step_a_00000000.html".to_string()
            }
        );

        let inline = StepVisual::from(VisualArtifact {
            mode: ArtifactMode::Inline,
            ..artifact
        });
        assert_eq!(
            inline,
            StepVisual::Inline {
                html: "<html></html>".to_string()
            }
        );
    }
}
