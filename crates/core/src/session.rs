//! Lesson data model: the records a single lesson request owns while its
//! block sequence is being produced.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, trimmed subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of the lesson plan. Ordinals start at 1 and are contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStep {
    pub ordinal: usize,
    pub title: String,
}

impl LearningStep {
    pub fn new(ordinal: usize, title: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
        }
    }
}

/// How an artifact is handed to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactMode {
    Link,
    Inline,
}

/// A persisted, self-contained document illustrating one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualArtifact {
    pub step_ordinal: usize,
    pub storage_key: String,
    pub content: String,
    pub mode: ArtifactMode,
    /// Where the store published the document.
    pub reference: String,
}

/// Where a lesson is in its forward-only lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "ordinal", rename_all = "snake_case")]
pub enum Stage {
    Init,
    OutlineEmitted,
    /// The step with this ordinal was the last one emitted.
    StepEmitted(usize),
    Complete,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }
}

/// The per-request lesson state. Lives only as long as its block stream.
#[derive(Debug, Clone)]
pub struct LessonSession {
    pub topic: String,
    pub steps: Vec<LearningStep>,
    pub stage: Stage,
}

impl LessonSession {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            steps: Vec::new(),
            stage: Stage::Init,
        }
    }

    /// The step to produce after the current stage, if one remains.
    pub fn next_step(&self) -> Option<&LearningStep> {
        match self.stage {
            Stage::OutlineEmitted => self.steps.first(),
            Stage::StepEmitted(ordinal) => self.steps.get(ordinal),
            _ => None,
        }
    }
}
