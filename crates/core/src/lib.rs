//! Tutor Core
//!
//! Turns a topic into a staged, incrementally delivered lesson: an outline,
//! a conversational explanation per step and, optionally, a self-contained
//! HTML visualization per step. Transport, configuration loading and client
//! construction live in the hosting service.

pub mod block;
pub mod config;
pub mod error;
pub mod explainer;
pub mod lesson;
pub mod llm_client;
pub mod outline;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod store;
pub mod visualization;

pub use block::LessonBlock;
pub use config::{PipelineConfig, VisualizationMode};
pub use pipeline::{LessonOptions, LessonOutput, TutorPipeline};
