//! Error Taxonomy
//!
//! Typed errors for every stage of lesson generation. None of these are
//! retried by the core: the assembler turns them into a single failure block
//! and ends the lesson.

use std::fmt;
use std::io;

/// The category of a failed model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    Timeout,
    Auth,
    RateLimit,
    MalformedResponse,
    /// Transport or backend failures that fit none of the other kinds.
    Upstream,
}

impl fmt::Display for ModelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErrorKind::Timeout => write!(f, "timeout"),
            ModelErrorKind::Auth => write!(f, "auth"),
            ModelErrorKind::RateLimit => write!(f, "rate_limit"),
            ModelErrorKind::MalformedResponse => write!(f, "malformed_response"),
            ModelErrorKind::Upstream => write!(f, "upstream"),
        }
    }
}

/// A failure reported by the model collaborator for a single completion call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("model call failed ({kind}): {message}")]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn new(kind: ModelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Rejected lesson input. Produces one explanatory block and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the topic is empty")]
    EmptyTopic,
    #[error("max_steps must be a positive number")]
    NonPositiveMaxSteps,
}

/// A model call for a specific step failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("generation failed at step {step_ordinal} ('{step_title}'): {cause}")]
pub struct GenerationError {
    pub step_ordinal: usize,
    pub step_title: String,
    #[source]
    pub cause: ModelError,
}

/// The artifact store could not publish a document.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("an artifact named '{key}' already exists")]
    KeyExists { key: String },
    #[error("'{key}' is not a valid artifact key")]
    InvalidKey { key: String },
    #[error("failed to write artifact '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Failure of the optional visualization stage.
#[derive(Debug, thiserror::Error)]
pub enum VisualizationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("storing the visualization for step {step_ordinal} failed: {source}")]
    Storage {
        step_ordinal: usize,
        #[source]
        source: StorageError,
    },
}

/// Every way a lesson can end early.
#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The model answered, but nothing in the answer parsed as a step title.
    #[error("no learning steps could be parsed from the outline")]
    OutlineParse,
    #[error("outline generation failed: {0}")]
    Outline(#[source] ModelError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Visualization(#[from] VisualizationError),
}

impl LessonError {
    /// The ordinal of the step that was in progress, if any.
    pub fn step_ordinal(&self) -> Option<usize> {
        match self {
            LessonError::Generation(e) => Some(e.step_ordinal),
            LessonError::Visualization(VisualizationError::Generation(e)) => Some(e.step_ordinal),
            LessonError::Visualization(VisualizationError::Storage { step_ordinal, .. }) => {
                Some(*step_ordinal)
            }
            _ => None,
        }
    }
}
