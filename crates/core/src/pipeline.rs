//! Tutor Pipeline Entry Point
//!
//! Wires the generators together for one request and hands back either the
//! lazy block stream or, in non-streaming mode, the whole lesson rendered as
//! one Markdown string.

use crate::{
    block::LessonBlock,
    config::{PipelineConfig, VisualizationMode},
    explainer::StepExplainer,
    lesson::LessonStreamAssembler,
    llm_client::LLMClient,
    outline::OutlineGenerator,
    prompts::PromptTemplates,
    store::ArtifactStore,
    visualization::VisualizationGenerator,
};
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A prior chat message. Accepted for host compatibility; lessons ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// Per-request overrides on top of the pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonOptions {
    pub max_steps: Option<usize>,
    pub visualization_mode: Option<VisualizationMode>,
    /// `false` selects the aggregated, single-string output.
    pub stream: bool,
}

impl Default for LessonOptions {
    fn default() -> Self {
        Self {
            max_steps: None,
            visualization_mode: None,
            stream: true,
        }
    }
}

pub enum LessonOutput {
    Stream(BoxStream<'static, LessonBlock>),
    Aggregated(String),
}

impl LessonOutput {
    /// Collapses either form into the rendered Markdown lesson.
    pub async fn into_text(self) -> String {
        match self {
            LessonOutput::Stream(stream) => aggregate(stream).await,
            LessonOutput::Aggregated(text) => text,
        }
    }
}

/// Renders every block of `stream` in order and joins them with newlines.
pub async fn aggregate(stream: BoxStream<'static, LessonBlock>) -> String {
    let rendered: Vec<String> = stream.map(|block| block.render()).collect().await;
    rendered.join("\n")
}

pub struct TutorPipeline {
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn ArtifactStore>,
    config: PipelineConfig,
    prompts: Arc<PromptTemplates>,
}

impl TutorPipeline {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        store: Arc<dyn ArtifactStore>,
        config: PipelineConfig,
        prompts: PromptTemplates,
    ) -> Self {
        Self {
            llm,
            store,
            config,
            prompts: Arc::new(prompts),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Builds a fresh assembler for one lesson with the request's overrides.
    pub fn assembler(&self, topic: &str, options: &LessonOptions) -> LessonStreamAssembler {
        let mut config = self.config.clone();
        if let Some(max_steps) = options.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(mode) = options.visualization_mode {
            config.visualization_mode = mode;
        }

        let model = config.model_name.clone();
        LessonStreamAssembler::new(
            topic,
            config.max_steps,
            OutlineGenerator::new(self.llm.clone(), model.clone(), self.prompts.clone()),
            StepExplainer::new(self.llm.clone(), model, self.prompts.clone()),
            VisualizationGenerator::new(
                self.llm.clone(),
                self.store.clone(),
                self.prompts.clone(),
                &config,
            ),
        )
    }

    /// Runs a lesson for `topic`.
    ///
    /// `model_id` is the identifier the host routed the request by; completions
    /// always use the configured `model_name`. `history` is not consulted.
    pub async fn run(
        &self,
        topic: &str,
        model_id: &str,
        _history: &[HistoryMessage],
        options: LessonOptions,
    ) -> LessonOutput {
        info!(
            topic = topic.trim(),
            model_id,
            model = %self.config.model_name,
            stream = options.stream,
            "Lesson requested"
        );
        let stream = self.assembler(topic, &options).into_stream();
        if options.stream {
            LessonOutput::Stream(stream)
        } else {
            LessonOutput::Aggregated(aggregate(stream).await)
        }
    }
}
