//! Lesson Stream Assembly
//!
//! Drives one lesson through `Init -> OutlineEmitted -> StepEmitted(1..=K) ->
//! Complete`, with `Failed` as the other terminal. Each call to
//! [`LessonStreamAssembler::next_block`] performs exactly the work needed for
//! the next block, so a consumer that stops reading stops generation. Steps
//! are produced strictly in ordinal order and nothing emitted is revisited.

use crate::{
    block::{COMPLETION_MESSAGE, LessonBlock, StepVisual},
    error::{LessonError, ValidationError},
    explainer::StepExplainer,
    outline::OutlineGenerator,
    session::{LearningStep, LessonSession, Stage, Topic},
    visualization::VisualizationGenerator,
};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{info, warn};

pub struct LessonStreamAssembler {
    session: LessonSession,
    max_steps: usize,
    outline: OutlineGenerator,
    explainer: StepExplainer,
    visualizer: Option<VisualizationGenerator>,
}

impl LessonStreamAssembler {
    pub fn new(
        topic: impl Into<String>,
        max_steps: usize,
        outline: OutlineGenerator,
        explainer: StepExplainer,
        visualizer: Option<VisualizationGenerator>,
    ) -> Self {
        Self {
            session: LessonSession::new(topic),
            max_steps,
            outline,
            explainer,
            visualizer,
        }
    }

    pub fn session(&self) -> &LessonSession {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage
    }

    /// Produces the next block, or `None` once the lesson has ended.
    pub async fn next_block(&mut self) -> Option<LessonBlock> {
        match self.session.stage {
            Stage::Init => Some(self.start().await),
            Stage::OutlineEmitted | Stage::StepEmitted(_) => Some(self.advance().await),
            Stage::Complete | Stage::Failed => None,
        }
    }

    /// Turns the assembler into a lazy, finite stream of blocks.
    pub fn into_stream(self) -> BoxStream<'static, LessonBlock> {
        stream::unfold(self, |mut assembler| async move {
            let block = assembler.next_block().await?;
            Some((block, assembler))
        })
        .boxed()
    }

    fn validate(&self) -> Result<Topic, ValidationError> {
        let topic = Topic::parse(&self.session.topic)?;
        if self.max_steps == 0 {
            return Err(ValidationError::NonPositiveMaxSteps);
        }
        Ok(topic)
    }

    async fn start(&mut self) -> LessonBlock {
        let topic = match self.validate() {
            Ok(topic) => topic,
            Err(e) => return self.fail(e.into()),
        };
        self.session.topic = topic.to_string();
        info!(topic = %topic, max_steps = self.max_steps, "Starting lesson");

        let steps = match self.outline.generate(topic.as_str(), self.max_steps).await {
            Ok(steps) if steps.is_empty() => return self.fail(LessonError::OutlineParse),
            Ok(steps) => steps,
            Err(e) => return self.fail(LessonError::Outline(e)),
        };

        self.session.steps = steps;
        self.session.stage = Stage::OutlineEmitted;
        LessonBlock::Outline {
            topic: self.session.topic.clone(),
            steps: self.session.steps.clone(),
        }
    }

    async fn advance(&mut self) -> LessonBlock {
        let Some(step) = self.session.next_step().cloned() else {
            self.session.stage = Stage::Complete;
            info!(topic = %self.session.topic, steps = self.session.steps.len(), "Lesson complete");
            return LessonBlock::Completion {
                message: COMPLETION_MESSAGE.to_string(),
            };
        };

        match self.produce_step(&step).await {
            Ok(block) => {
                self.session.stage = Stage::StepEmitted(step.ordinal);
                block
            }
            Err(e) => self.fail(e),
        }
    }

    async fn produce_step(&self, step: &LearningStep) -> Result<LessonBlock, LessonError> {
        let explanation = self.explainer.explain(&self.session.topic, step).await?;
        let visual = match &self.visualizer {
            Some(visualizer) => Some(StepVisual::from(
                visualizer.generate(step, &step.title).await?,
            )),
            None => None,
        };
        info!(ordinal = step.ordinal, title = %step.title, "Step ready");
        Ok(LessonBlock::Step {
            ordinal: step.ordinal,
            title: step.title.clone(),
            explanation,
            visual,
        })
    }

    fn fail(&mut self, error: LessonError) -> LessonBlock {
        warn!(topic = %self.session.topic, stage = ?self.session.stage, error = %error, "Lesson failed");
        self.session.stage = Stage::Failed;
        LessonBlock::Failure {
            ordinal: error.step_ordinal(),
            reason: failure_reason(&error, &self.session.topic),
        }
    }
}

fn failure_reason(error: &LessonError, topic: &str) -> String {
    match error {
        LessonError::Validation(ValidationError::EmptyTopic) => {
            "Please tell me which topic you'd like to learn about.".to_string()
        }
        LessonError::Validation(ValidationError::NonPositiveMaxSteps) => {
            "The lesson needs room for at least one step (max_steps must be positive).".to_string()
        }
        LessonError::OutlineParse => format!(
            "I couldn't put together a learning plan for **{}**. Try rephrasing the topic.",
            topic
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, VisualizationMode};
    use crate::error::{ModelError, ModelErrorKind, StorageError};
    use crate::llm_client::{LLMClient, MockLLMClient};
    use crate::prompts::PromptTemplates;
    use crate::store::{ArtifactStore, FsArtifactStore, MockArtifactStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn prompts() -> Arc<PromptTemplates> {
        Arc::new(PromptTemplates {
            outline: "OUTLINE {topic} {max_steps}".to_string(),
            explain_step: "EXPLAIN {step}".to_string(),
            visualize_step: "VISUAL {step}".to_string(),
        })
    }

    /// A model that answers by prompt kind: the outline, a canned explanation
    /// per step title, or an HTML fragment.
    fn scripted_llm(outline: &'static str) -> MockLLMClient {
        let mut mock = MockLLMClient::new();
        mock.expect_complete().returning(move |_, prompt| {
            if prompt.starts_with("OUTLINE") {
                Ok(outline.to_string())
            } else if let Some(step) = prompt.strip_prefix("EXPLAIN ") {
                Ok(format!("Canned explanation of {}", step))
            } else {
                Ok("<svg></svg>".to_string())
            }
        });
        mock
    }

    fn assembler(
        topic: &str,
        max_steps: usize,
        llm: MockLLMClient,
        visualization: Option<(VisualizationMode, Arc<dyn ArtifactStore>)>,
    ) -> LessonStreamAssembler {
        let llm: Arc<dyn LLMClient> = Arc::new(llm);
        let model = "test-model".to_string();
        let visualizer = visualization.and_then(|(mode, store)| {
            let config = PipelineConfig {
                visualization_mode: mode,
                ..PipelineConfig::default()
            };
            VisualizationGenerator::new(llm.clone(), store, prompts(), &config)
        });
        LessonStreamAssembler::new(
            topic,
            max_steps,
            OutlineGenerator::new(llm.clone(), model.clone(), prompts()),
            StepExplainer::new(llm, model, prompts()),
            visualizer,
        )
    }

    async fn collect(assembler: LessonStreamAssembler) -> Vec<LessonBlock> {
        assembler.into_stream().collect().await
    }

    #[tokio::test]
    async fn test_recursion_scenario_emits_five_blocks() {
        let llm = scripted_llm("1. What is Recursion\n2. Base Case\n3. Example");
        let blocks = collect(assembler("Recursion", 3, llm, None)).await;

        assert_eq!(blocks.len(), 5);
        match &blocks[0] {
            LessonBlock::Outline { topic, steps } => {
                assert_eq!(topic, "Recursion");
                let titles: Vec<&str> = steps.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles, vec!["What is Recursion", "Base Case", "Example"]);
            }
            other => panic!("expected outline, got {:?}", other),
        }
        let expected = ["What is Recursion", "Base Case", "Example"];
        for (i, block) in blocks[1..4].iter().enumerate() {
            match block {
                LessonBlock::Step {
                    ordinal,
                    title,
                    explanation,
                    visual,
                } => {
                    assert_eq!(*ordinal, i + 1);
                    assert_eq!(title, expected[i]);
                    assert_eq!(explanation, &format!("Canned explanation of {}", expected[i]));
                    assert!(visual.is_none());
                }
                other => panic!("expected step, got {:?}", other),
            }
        }
        assert!(matches!(blocks[4], LessonBlock::Completion { .. }));
    }

    #[tokio::test]
    async fn test_outline_is_capped_at_max_steps() {
        let llm = scripted_llm("1. A\n2. B\n3. C\n4. D\n5. E");
        let blocks = collect(assembler("Letters", 2, llm, None)).await;
        assert_eq!(blocks.len(), 1 + 2 + 1);
        assert_eq!(blocks.iter().filter(|b| b.is_step()).count(), 2);
    }

    #[tokio::test]
    async fn test_blank_outline_fails_with_single_block() {
        let mut lesson = assembler("Recursion", 5, scripted_llm("  \n \n"), None);
        let first = lesson.next_block().await.unwrap();
        assert!(first.is_failure());
        assert_eq!(lesson.stage(), Stage::Failed);
        assert!(lesson.next_block().await.is_none());
    }

    #[tokio::test]
    async fn test_unparsable_outline_fails_like_empty() {
        let blocks = collect(assembler("Recursion", 5, scripted_llm("1.\n2)\n- "), None)).await;
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            LessonBlock::Failure { ordinal, reason } => {
                assert_eq!(*ordinal, None);
                assert!(reason.contains("Recursion"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_the_model() {
        // A mock with no expectations panics if it is called.
        let blocks = collect(assembler("   ", 5, MockLLMClient::new(), None)).await;
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_failure());

        let blocks = collect(assembler("Recursion", 0, MockLLMClient::new(), None)).await;
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].render().contains("max_steps"));
    }

    #[tokio::test]
    async fn test_outline_model_error_fails_lesson() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete()
            .times(1)
            .returning(|_, _| Err(ModelError::new(ModelErrorKind::Auth, "invalid key")));
        let blocks = collect(assembler("Recursion", 3, llm, None)).await;
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].render().contains("auth"));
    }

    #[tokio::test]
    async fn test_mid_lesson_failure_keeps_earlier_blocks() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete().returning(|_, prompt| {
            if prompt.starts_with("OUTLINE") {
                Ok("1. One\n2. Two\n3. Three".to_string())
            } else if prompt == "EXPLAIN Two" {
                Err(ModelError::new(ModelErrorKind::Timeout, "no answer"))
            } else {
                Ok("fine".to_string())
            }
        });
        let mut lesson = assembler("Counting", 3, llm, None);

        let mut blocks = Vec::new();
        while let Some(block) = lesson.next_block().await {
            blocks.push(block);
        }
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], LessonBlock::Outline { .. }));
        assert!(matches!(blocks[1], LessonBlock::Step { ordinal: 1, .. }));
        match &blocks[2] {
            LessonBlock::Failure { ordinal, reason } => {
                assert_eq!(*ordinal, Some(2));
                assert!(reason.contains("Two"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(lesson.stage(), Stage::Failed);
    }

    #[tokio::test]
    async fn test_inline_visualization_attached_to_each_step() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()).unwrap());
        let llm = scripted_llm("1. Nodes\n2. Edges");
        let blocks = collect(assembler(
            "Graphs",
            5,
            llm,
            Some((VisualizationMode::Inline, store)),
        ))
        .await;

        assert_eq!(blocks.len(), 4);
        for block in &blocks[1..3] {
            match block {
                LessonBlock::Step {
                    visual: Some(StepVisual::Inline { html }),
                    ..
                } => assert!(html.contains("<svg></svg>") && html.contains("<html>")),
                other => panic!("expected inline visual, got {:?}", other),
            }
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_stops_remaining_steps() {
        let mut store = MockArtifactStore::new();
        store.expect_put().times(1).returning(|key, _| {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("read-only filesystem"),
            })
        });
        let store: Arc<dyn ArtifactStore> = Arc::new(store);
        let llm = scripted_llm("1. Nodes\n2. Edges");
        let blocks = collect(assembler(
            "Graphs",
            5,
            llm,
            Some((VisualizationMode::Link, store)),
        ))
        .await;

        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1], LessonBlock::Failure { ordinal: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_partial_consumption_stops_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut llm = MockLLMClient::new();
        llm.expect_complete().returning(move |_, prompt| {
            counter.fetch_add(1, Ordering::SeqCst);
            if prompt.starts_with("OUTLINE") {
                Ok("1. A\n2. B\n3. C".to_string())
            } else {
                Ok("text".to_string())
            }
        });

        let stream = assembler("Letters", 3, llm, None).into_stream();
        let first_two: Vec<LessonBlock> = stream.take(2).collect().await;
        assert!(matches!(first_two[0], LessonBlock::Outline { .. }));
        assert!(matches!(first_two[1], LessonBlock::Step { ordinal: 1, .. }));
        // One outline call plus one explanation; steps 2 and 3 never ran.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_finished_lesson_is_not_restartable() {
        let mut lesson = assembler("Recursion", 1, scripted_llm("1. Only"), None);
        while lesson.next_block().await.is_some() {}
        assert_eq!(lesson.stage(), Stage::Complete);
        assert!(lesson.next_block().await.is_none());
        assert_eq!(lesson.session().steps.len(), 1);
    }
}
